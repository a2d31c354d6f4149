use jit_trace_studio::model::{
    AssemblyBlock, AssemblyProcessor, AttachSummary, ClassModel, CodeCacheEventKind,
    JournalKind, MemberSignature, PackageManager,
};
use jit_trace_studio::parser::{HotSpotLogParser, StopHandle};
use jit_trace_studio::utils::config::{
    MISSING_TRACE_CLASS_LOADING_BODY, MISSING_TRACE_CLASS_LOADING_TITLE,
};
use jit_trace_studio::utils::error::LogError;
use pretty_assertions::assert_eq;
use std::io::{BufRead, Read, Write};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

const SAMPLE_LOG: &str = "\
<?xml version='1.0' encoding='UTF-8'?>
<hotspot_log version='160 1' process='4242' time_ms='1700000000000'>
<vm_version>
<name>
OpenJDK 64-Bit Server VM
</name>
<release>
17.0.2+8
</release>
</vm_version>
<vm_arguments>
<command>
com.example.Main --iterations 10
</command>
</vm_arguments>
<tty>
<writer thread='140120'/>
<start_compile_thread name='C2 CompilerThread0' thread='140121' process='4242' stamp='0.050'/>
<start_compile_thread name='C1 CompilerThread0' thread='140122' process='4242' stamp='0.051'/>
[Loaded java.lang.Object from file:/opt/jdk/lib/rt.jar]
[Loaded java.lang.String from file:/opt/jdk/lib/rt.jar]
[Loaded com.example.Main from file:/home/dev/My%20App/classes/]
<task_queued compile_id='1' method='java/lang/String hashCode ()I' bytes='55' count='5000' iicount='5000' level='3' stamp='0.100' comment='tiered' hot_count='5000'/>
<task_queued compile_id='2' method='com/example/Main loop (I)V' bytes='40' count='10000' backedge_count='60000' osr_bci='5' level='4' stamp='0.120' comment='tiered' hot_count='60000'/>
<writer thread='140121'/>
<task compile_id='2' compile_kind='osr' method='com/example/Main loop (I)V' bytes='40' count='10000' osr_bci='5' level='4' stamp='0.121'>
<phase name='parse' nodes='3' live='3' stamp='0.121'>
<parse method='1001' uses='10000' stamp='0.121'>
<bc code='182' bci='10'/>
<call method='1002' count='10000' prof_factor='1' inline='1'/>
<inline_success reason='inline (hot)'/>
</parse>
<phase_done name='parse' nodes='120' live='100' stamp='0.124'/>
</phase>
<code_cache total_blobs='300' nmethods='12' adapters='150' free_code_cache='248000000'/>
<task_done success='1' nmsize='384' count='10000' inlined_bytes='35' stamp='0.171'/>
</task>
<writer thread='140122'/>
<task compile_id='1' method='java/lang/String hashCode ()I' bytes='55' count='5000' level='3' stamp='0.101'>
<task_done success='1' nmsize='208' count='5000' stamp='0.106'/>
</task>
  @ 3   java.lang.String::isLatin1 (19 bytes)   inline (hot)
<nmethod compile_id='1' compiler='c1' level='3' method='java/lang/String hashCode ()I' bytes='55' count='5000' address='0x00007f0000001010' code_begin='0x00007f0000001200' size='608' insts_bytes='208' stamp='0.107'/>
Decoding compiled method 0x00007f0000001010:
Code:
  0x00007f0000001200: mov    %eax,-0x16000(%rsp)
  0x00007f0000001207: push   %rbp
  0x00007f0000001208: hlt <nmethod compile_id='2' compile_kind='osr' compiler='c2' level='4' method='com/example/Main loop (I)V' bytes='40' address='0x00007f0000002010' size='1024' stamp='0.172'/>
<sweeper state='finished' traversals='1' total_blobs='280' stamp='2.500'/>
<code_cache_full stamp='3.000'/>
<make_not_entrant thread='140121' compile_id='1' compiler='c1' level='3' stamp='3.100'/>
<hotspot_log_done stamp='4.250'/>
";

fn write_log(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn parse_str(content: &str) -> (HotSpotLogParser, Vec<(String, String)>) {
    let mut errors = Vec::new();
    let mut parser = HotSpotLogParser::new();
    parser.parse_reader(content.as_bytes(), &mut |title: &str, body: &str| {
        errors.push((title.to_string(), body.to_string()))
    });
    (parser, errors)
}

fn member_sig(method: &str) -> MemberSignature {
    MemberSignature::parse(method).unwrap()
}

#[test]
fn test_full_log_from_file() {
    let log = write_log(SAMPLE_LOG);
    let mut errors = Vec::new();
    let mut parser = HotSpotLogParser::new();
    let lines = parser
        .parse(log.path(), &mut |title: &str, body: &str| {
            errors.push((title.to_string(), body.to_string()))
        })
        .unwrap();

    assert_eq!(lines, SAMPLE_LOG.lines().count());
    assert!(errors.is_empty());
    assert!(!parser.context().has_parse_error());
    assert!(parser.context().has_trace_class_load);

    let model = parser.model();
    assert_eq!(model.vm_version_release(), Some("17.0.2+8"));
    assert_eq!(model.vm_command(), Some("com.example.Main --iterations 10"));
    assert_eq!(model.end_of_log_stamp(), Some(4.25));

    assert_eq!(
        parser.classpath().locations(),
        &["/opt/jdk/lib/rt.jar".to_string(), "/home/dev/My App/classes/".to_string()]
    );
    assert_eq!(model.package_manager().class_count(), 3);
    assert_eq!(model.package_manager().member_count(), 2);
}

#[test]
fn test_full_log_statistics() {
    let (parser, _) = parse_str(SAMPLE_LOG);
    let stats = parser.model().jit_stats();

    assert_eq!(stats.compiler_threads, 2);
    assert_eq!(stats.queued_tasks, 2);
    assert_eq!(stats.compiled_methods, 2);
    assert_eq!(stats.c1_compilations, 1);
    assert_eq!(stats.c2_compilations, 1);
    assert_eq!(stats.osr_compilations, 1);
    assert_eq!(stats.native_bytes, 608 + 1024);
    assert_eq!(stats.completed_tasks, 2);
    assert_eq!(stats.failed_tasks, 0);
    assert_eq!(stats.sweeper_events, 1);
    assert_eq!(stats.cache_full_events, 1);

    let kinds: Vec<CodeCacheEventKind> = parser
        .model()
        .code_cache_events()
        .iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            CodeCacheEventKind::Compilation,
            CodeCacheEventKind::Sweeper,
            CodeCacheEventKind::CacheFull
        ]
    );
}

#[test]
fn test_member_journal_and_attributes() {
    let (parser, _) = parse_str(SAMPLE_LOG);
    let pm = parser.model().package_manager();

    let loop_member = pm.member(&member_sig("com/example/Main loop (I)V")).unwrap();
    let kinds: Vec<JournalKind> = loop_member.journal().entries().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![JournalKind::Queued, JournalKind::Task, JournalKind::Compiled]);
    assert_eq!(loop_member.queued_attribute("stamp"), Some("0.120"));
    assert_eq!(loop_member.task_attribute("nmsize"), Some("384"));
    assert_eq!(loop_member.compiled_attribute("size"), Some("1024"));
    assert!((loop_member.compile_time().unwrap() - 0.050).abs() < 1e-9);

    let task_entry = &loop_member.journal().entries()[1];
    let task = task_entry.element.as_task().unwrap();
    assert_eq!(task.compilation_len(), 8);
}

#[test]
fn test_assembly_attached_by_address() {
    let (parser, _) = parse_str(SAMPLE_LOG);
    let pm = parser.model().package_manager();

    let hash_code = pm.member(&member_sig("java/lang/String hashCode ()I")).unwrap();
    let block = hash_code.assembly().expect("assembly should be attached");
    assert_eq!(block.address, "0x00007f0000001010");
    assert_eq!(
        block.lines,
        vec![
            "Code:".to_string(),
            "  0x00007f0000001200: mov    %eax,-0x16000(%rsp)".to_string(),
            "  0x00007f0000001207: push   %rbp".to_string(),
            "  0x00007f0000001208: hlt ".to_string(),
        ]
    );

    let loop_member = pm.member(&member_sig("com/example/Main loop (I)V")).unwrap();
    assert!(loop_member.assembly().is_none());
    assert_eq!(parser.attach_summary(), AttachSummary { attached: 1, unmatched: 0 });
}

#[test]
fn test_stream_counts() {
    let (parser, _) = parse_str(SAMPLE_LOG);
    let split_log = parser.split_log();
    assert_eq!(split_log.header_lines().len(), 15);
    assert_eq!(split_log.class_loader_lines().len(), 3);
    assert_eq!(split_log.assembly_lines().len(), 5);
}

#[test]
fn test_header_end_and_queued_event() {
    let (parser, _) = parse_str(
        "<?xml version='1.0'?>\n<hotspot_log>\n<tty>\n<task_queued compile_id='1' method='A m ()V' stamp='0.1'/>\n",
    );

    assert_eq!(parser.split_log().header_lines().len(), 2);
    assert_eq!(parser.split_log().compilation_lines().len(), 1);

    let member = parser
        .model()
        .package_manager()
        .member(&member_sig("A m ()V"))
        .unwrap();
    assert_eq!(member.queued_attribute("compile_id"), Some("1"));
    assert_eq!(member.journal().len(), 1);
}

#[test]
fn test_inlined_nmethod_records_compiled_event() {
    let (parser, _) = parse_str(
        "  0x00007fa8 hlt <nmethod compile_id='7' method='X y ()V' address='0x1' size='8'/>\n",
    );

    assert_eq!(parser.split_log().assembly_lines()[0].line, "  0x00007fa8 hlt ");
    let member = parser
        .model()
        .package_manager()
        .member(&member_sig("X y ()V"))
        .unwrap();
    assert!(member.is_compiled());
    assert_eq!(member.native_size(), Some(8));
}

#[test]
fn test_class_load() {
    let (parser, errors) = parse_str("[Loaded java.lang.String from file:/opt/jdk/lib/rt.jar]\n");

    assert!(errors.is_empty());
    assert!(parser.context().has_trace_class_load);
    assert_eq!(parser.classpath().locations(), &["/opt/jdk/lib/rt.jar".to_string()]);
    assert!(parser.model().package_manager().class("java.lang.String").is_some());
}

#[test]
fn test_missing_switch_reported() {
    let (parser, errors) = parse_str("<tty>\n<task_queued compile_id='1' method='A m ()V'/>\n");

    assert_eq!(
        errors,
        vec![(
            MISSING_TRACE_CLASS_LOADING_TITLE.to_string(),
            MISSING_TRACE_CLASS_LOADING_BODY.to_string()
        )]
    );
    assert_eq!(
        errors[0].0,
        "Missing VM Switch -XX:+TraceClassLoading"
    );
    assert!(parser.context().has_parse_error());
}

#[test]
fn test_stray_print_compilation_dropped() {
    let (parser, _) = parse_str("@ 3 java.lang.Math::abs (5 bytes)\n");
    assert!(parser.split_log().is_empty());
}

#[test]
fn test_empty_input() {
    let (parser, errors) = parse_str("");
    assert!(parser.split_log().is_empty());
    assert!(parser.context().has_parse_error());
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_header_only_input() {
    let (parser, errors) = parse_str(
        "<?xml version='1.0'?>\n<hotspot_log process='1'>\n<vm_version>\n<release>\n11.0.1\n</release>\n</vm_version>\n",
    );

    let split_log = parser.split_log();
    assert!(split_log.compilation_lines().is_empty());
    assert!(split_log.class_loader_lines().is_empty());
    assert!(split_log.assembly_lines().is_empty());
    assert_eq!(parser.model().vm_version_release(), Some("11.0.1"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_missing_file() {
    let mut parser = HotSpotLogParser::new();
    let mut ignore = |_: &str, _: &str| {};
    let result = parser.parse("/no/such/hotspot.log", &mut ignore);
    assert!(matches!(result, Err(LogError::Open { .. })));
}

#[test]
fn test_custom_body_skip() {
    let mut parser = HotSpotLogParser::new().with_body_skip(["<nmethod"]);
    let mut ignore = |_: &str, _: &str| {};
    parser.parse_reader(
        "<nmethod compile_id='1' method='A m ()V' size='10'/>\n".as_bytes(),
        &mut ignore,
    );
    assert_eq!(parser.model().jit_stats().compiled_methods, 0);
}

/// Clears the flag through a `StopHandle` once `stop_after` lines were served
struct StoppingReader {
    lines: Vec<String>,
    served: usize,
    stop_after: usize,
    handle: StopHandle,
}

impl Read for StoppingReader {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        let n = {
            let buf = self.fill_buf()?;
            let n = buf.len().min(out.len());
            out[..n].copy_from_slice(&buf[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for StoppingReader {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        Ok(self
            .lines
            .get(self.served)
            .map(|l| l.as_bytes())
            .unwrap_or(&[]))
    }

    fn consume(&mut self, amt: usize) {
        if amt > 0 {
            self.served += 1;
            if self.served == self.stop_after {
                self.handle.stop();
            }
        }
    }
}

#[test]
fn test_stop_keeps_classified_lines() {
    let mut parser = HotSpotLogParser::new();
    let reader = StoppingReader {
        lines: vec![
            "[Loaded A from file:/a.jar]\n".to_string(),
            "<task_queued compile_id='1' method='A m ()V'/>\n".to_string(),
            "<task_queued compile_id='2' method='A n ()V'/>\n".to_string(),
            "<task_queued compile_id='3' method='A o ()V'/>\n".to_string(),
        ],
        served: 0,
        stop_after: 2,
        handle: parser.stop_handle(),
    };

    let mut ignore = |_: &str, _: &str| {};
    let lines = parser.parse_reader(reader, &mut ignore);

    assert_eq!(lines, 2);
    assert_eq!(parser.split_log().compilation_lines().len(), 1);
    // later phases still ran on what was read
    assert_eq!(parser.model().package_manager().member_count(), 1);
    assert!(parser.context().has_trace_class_load);
}

#[derive(Default)]
struct RecordingProcessor {
    lines: Arc<Mutex<Vec<String>>>,
}

impl AssemblyProcessor for RecordingProcessor {
    fn handle_line(&mut self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn complete(&mut self) {}

    fn attach_assembly_to_members(&mut self, package_manager: &mut PackageManager) -> AttachSummary {
        let lines = self.lines.lock().unwrap().clone();
        let mut attached = 0;
        for member in package_manager.members_mut() {
            member.set_assembly(AssemblyBlock {
                address: "custom".to_string(),
                lines: lines.clone(),
            });
            attached += 1;
        }
        AttachSummary { attached, unmatched: 0 }
    }

    fn clear(&mut self) {}
}

#[test]
fn test_custom_assembly_processor() {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let processor = RecordingProcessor {
        lines: Arc::clone(&recorded),
    };

    let mut parser = HotSpotLogParser::new().with_assembly_processor(Box::new(processor));
    let mut ignore = |_: &str, _: &str| {};
    parser.parse_reader(
        "<nmethod compile_id='1' method='A m ()V'/>\n  0x01: nop\n  0x02: ret\n".as_bytes(),
        &mut ignore,
    );

    assert_eq!(*recorded.lock().unwrap(), vec!["  0x01: nop", "  0x02: ret"]);
    assert_eq!(parser.attach_summary().attached, 1);
}

#[test]
fn test_class_load_glued_to_tag() {
    let (parser, errors) = parse_str(
        "<task_queued compile_id='1' method='A m ()V'/>[Loaded A from file:/a.jar]\n",
    );

    assert!(errors.is_empty());
    assert!(parser.context().has_trace_class_load);
    assert_eq!(parser.classpath().locations(), &["/a.jar".to_string()]);
    assert_eq!(parser.model().jit_stats().queued_tasks, 1);
}
