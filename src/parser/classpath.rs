//! Classpath and class model recovery from class-loader lines.
//!
//! Handles both the JDK 8 `-XX:+TraceClassLoading` form
//! (`[Loaded java.lang.String from file:/opt/jdk/lib/rt.jar]`) and the
//! unified logging form
//! (`[0.011s][info][class,load] java.lang.String source: jrt:/java.base`).

use super::context::ParseContext;
use super::splitter::NumberedLine;
use crate::model::{ClassModel, ParsedClasspath};
use crate::utils::config::{LOADED, S_FILE_COLON, S_FROM, S_SOURCE, UNIFIED_CLASS_LOAD};
use log::debug;
use percent_encoding::percent_decode_str;

/// True for lines written by class-load tracing
pub fn is_class_loader_line(line: &str) -> bool {
    let unbracketed = line.strip_prefix('[').unwrap_or(line);
    unbracketed.starts_with(LOADED) || (line.starts_with('[') && line.contains(UNIFIED_CLASS_LOAD))
}

/// Fully-qualified name of the loaded class
pub fn loaded_class_name(line: &str) -> Option<&str> {
    let after = match line.find(UNIFIED_CLASS_LOAD) {
        Some(pos) => &line[pos + UNIFIED_CLASS_LOAD.len()..],
        None => {
            let pos = line.find(LOADED)?;
            &line[pos + LOADED.len()..]
        }
    };

    let end = after.find(' ')?;
    let name = &after[..end];
    (!name.is_empty()).then_some(name)
}

/// Decoded filesystem location the class was loaded from, if it is a `file:` URL
pub fn loaded_class_location(line: &str) -> Option<String> {
    let marker = if line.contains(UNIFIED_CLASS_LOAD) {
        S_SOURCE
    } else {
        S_FROM
    };

    let pos = line.find(marker)?;
    let location = &line[pos + marker.len()..];
    let location = location.strip_suffix(']').unwrap_or(location);

    location.strip_prefix(S_FILE_COLON).map(decode_location)
}

/// Percent-decode a location as UTF-8, keeping the raw form if that fails
///
/// Only `%XX` escapes are decoded. A `+` stays a `+`: in a `file:` path it is
/// a literal character, not the space of `application/x-www-form-urlencoded`
/// decoding.
pub fn decode_location(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!("Keeping undecodable location '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

/// Register every `file:` location found in the class-loader stream
///
/// **Public** - phase 2 of the orchestrator
pub fn build_parsed_classpath(
    lines: &[NumberedLine],
    classpath: &mut ParsedClasspath,
    context: &mut ParseContext,
) {
    debug!("buildParsedClasspath() over {} lines", lines.len());

    for numbered_line in lines {
        if !context.has_trace_class_load {
            context.has_trace_class_load = true;
        }

        if let Some(location) = loaded_class_location(&numbered_line.line) {
            classpath.add_class_location(&location);
        }
    }
}

/// Register every loaded class with the class model
///
/// **Public** - phase 3 of the orchestrator
pub fn build_class_model<M: ClassModel + ?Sized>(lines: &[NumberedLine], model: &mut M) {
    debug!("buildClassModel() over {} lines", lines.len());

    for numbered_line in lines {
        if let Some(fq_class_name) = loaded_class_name(&numbered_line.line) {
            model.add_class(fq_class_name);
        }
    }
}
