//! Configuration and constants for the log decoder and CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Reader buffer size for log files (64 KiB)
pub const READ_BUFFER_SIZE: usize = 65_536;

/// Default number of methods listed in each report ranking
pub const DEFAULT_TOP_METHODS: usize = 20;
pub const MAX_TOP_METHODS: usize = 1000;

// Line-start characters that trigger trimmed-line normalisation
pub const C_OPEN_ANGLE: char = '<';
pub const C_OPEN_SQUARE_BRACKET: char = '[';
pub const C_AT: char = '@';

// Line prefixes used by the classifier
pub const S_OPEN_ANGLE: &str = "<";
pub const S_AT: &str = "@";
pub const TAG_XML: &str = "<?xml";
pub const TAG_TTY: &str = "<tty>";
pub const TAG_OPEN_CDATA: &str = "<![CDATA[";
pub const TAG_CLOSE_CDATA: &str = "]]>";
pub const TAG_OPEN_CLOSE_CDATA: &str = "<![CDATA[]]>";
pub const TAG_OPEN_NMETHOD: &str = "<nmethod";

// Class-loader line markers
pub const LOADED: &str = "Loaded ";
pub const UNIFIED_CLASS_LOAD: &str = "[class,load] ";
pub const S_FROM: &str = " from ";
pub const S_SOURCE: &str = " source: ";
pub const S_FILE_COLON: &str = "file:";

// Tag names
pub const TAG_VM_VERSION: &str = "vm_version";
pub const TAG_RELEASE: &str = "release";
pub const TAG_VM_ARGUMENTS: &str = "vm_arguments";
pub const TAG_COMMAND: &str = "command";
pub const TAG_TASK_QUEUED: &str = "task_queued";
pub const TAG_NMETHOD: &str = "nmethod";
pub const TAG_TASK: &str = "task";
pub const TAG_TASK_DONE: &str = "task_done";
pub const TAG_CODE_CACHE: &str = "code_cache";
pub const TAG_SWEEPER: &str = "sweeper";
pub const TAG_CODE_CACHE_FULL: &str = "code_cache_full";
pub const TAG_START_COMPILE_THREAD: &str = "start_compile_thread";
pub const TAG_HOTSPOT_LOG_DONE: &str = "hotspot_log_done";
pub const TAG_FRAGMENT: &str = "fragment";

// Attribute names
pub const ATTR_METHOD: &str = "method";
pub const ATTR_STAMP: &str = "stamp";
pub const ATTR_COMPILER: &str = "compiler";
pub const ATTR_COMPILE_KIND: &str = "compile_kind";
pub const ATTR_SIZE: &str = "size";
pub const ATTR_ADDRESS: &str = "address";
pub const ATTR_SUCCESS: &str = "success";

/// Tags promoted to a `Task` when they close at top level
pub const TASK_TAGS: &[&str] = &[TAG_TASK];

/// Tags that only ever appear at top level. Opening one of these while a
/// partial tree is open means the partial tree was truncated.
pub const TOP_LEVEL_TAGS: &[&str] = &[
    TAG_TASK_QUEUED,
    TAG_TASK,
    TAG_SWEEPER,
    TAG_CODE_CACHE_FULL,
    TAG_HOTSPOT_LOG_DONE,
    TAG_START_COMPILE_THREAD,
    TAG_VM_VERSION,
    TAG_VM_ARGUMENTS,
];

/// Header lines never handed to the tag processor
pub const SKIP_HEADER_TAGS: &[&str] = &[TAG_XML, "<hotspot_log"];

/// Body lines never handed to the tag processor
pub const SKIP_BODY_TAGS: &[&str] = &[
    "</tty>",
    "<tty_done",
    "<writer",
    "<compilation_log",
    "</compilation_log>",
    "<make_not_entrant",
    "<destroy_vm",
    "<statistics",
    "</statistics>",
    "</hotspot_log>",
    "<blob",
];

// Error dialog text for logs recorded without class-load tracing
pub const MISSING_TRACE_CLASS_LOADING_TITLE: &str = "Missing VM Switch -XX:+TraceClassLoading";
pub const MISSING_TRACE_CLASS_LOADING_BODY: &str = "jit-trace requires the -XX:+TraceClassLoading VM switch to be used.\nPlease recreate your log file with this switch enabled.";

/// Marker printed by the disassembler before each compiled method
pub const DECODING_COMPILED_METHOD: &str = "Decoding compiled method ";
