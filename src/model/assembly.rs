//! Disassembly collaborator: groups `-XX:+PrintAssembly` output by method.

use super::package::PackageManager;
use crate::utils::config::{ATTR_ADDRESS, DECODING_COMPILED_METHOD};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Disassembly of one compiled method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyBlock {
    /// nmethod address from the `Decoding compiled method` line
    pub address: String,
    pub lines: Vec<String>,
}

impl AssemblyBlock {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            lines: Vec::new(),
        }
    }
}

/// Outcome of attaching blocks to members
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachSummary {
    pub attached: usize,
    pub unmatched: usize,
}

/// Consumes the assembly stream after the compilation stream was dispatched
pub trait AssemblyProcessor {
    fn handle_line(&mut self, line: &str);

    /// Called once after the last line
    fn complete(&mut self);

    fn attach_assembly_to_members(&mut self, package_manager: &mut PackageManager)
        -> AttachSummary;

    fn clear(&mut self);
}

/// Default [`AssemblyProcessor`]. Lines before the first
/// `Decoding compiled method` marker are discarded.
#[derive(Debug, Default)]
pub struct AssemblyCollector {
    current: Option<AssemblyBlock>,
    blocks: Vec<AssemblyBlock>,
    unmatched: Vec<AssemblyBlock>,
    discarded_lines: usize,
}

impl AssemblyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[AssemblyBlock] {
        &self.blocks
    }

    /// Blocks with no member to attach to after the last attach
    pub fn unmatched(&self) -> &[AssemblyBlock] {
        &self.unmatched
    }

    pub fn discarded_lines(&self) -> usize {
        self.discarded_lines
    }
}

/// `Decoding compiled method 0x00007f...:` gives `0x00007f...`
fn block_address(line: &str) -> Option<&str> {
    let pos = line.find(DECODING_COMPILED_METHOD)?;
    let rest = &line[pos + DECODING_COMPILED_METHOD.len()..];
    let address = rest
        .split(|c: char| c == ':' || c.is_whitespace())
        .next()?;
    address.starts_with("0x").then_some(address)
}

impl AssemblyProcessor for AssemblyCollector {
    fn handle_line(&mut self, line: &str) {
        if let Some(address) = block_address(line) {
            if let Some(done) = self.current.take() {
                self.blocks.push(done);
            }
            self.current = Some(AssemblyBlock::new(address));
            return;
        }

        match self.current.as_mut() {
            Some(block) => block.lines.push(line.to_string()),
            None => self.discarded_lines += 1,
        }
    }

    fn complete(&mut self) {
        if let Some(done) = self.current.take() {
            self.blocks.push(done);
        }
        debug!(
            "Assembly collected: {} blocks, {} lines outside any block",
            self.blocks.len(),
            self.discarded_lines
        );
    }

    fn attach_assembly_to_members(
        &mut self,
        package_manager: &mut PackageManager,
    ) -> AttachSummary {
        let mut by_address: HashMap<String, usize> = HashMap::new();
        for (i, block) in self.blocks.iter().enumerate() {
            // a later block at a reused address wins
            by_address.insert(block.address.clone(), i);
        }

        let mut summary = AttachSummary::default();
        let mut used = vec![false; self.blocks.len()];

        for member in package_manager.members_mut() {
            let Some(index) = member
                .compiled_attribute(ATTR_ADDRESS)
                .and_then(|address| by_address.get(address))
            else {
                continue;
            };
            member.set_assembly(self.blocks[*index].clone());
            used[*index] = true;
            summary.attached += 1;
        }

        self.unmatched = self
            .blocks
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(block, _)| block.clone())
            .collect();
        summary.unmatched = self.unmatched.len();

        debug!(
            "Attached {} assembly blocks, {} unmatched",
            summary.attached, summary.unmatched
        );
        summary
    }

    fn clear(&mut self) {
        self.current = None;
        self.blocks.clear();
        self.unmatched.clear();
        self.discarded_lines = 0;
    }
}
