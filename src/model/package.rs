//! Classes and members known to the model, keyed by name.

use super::member::{MemberSignature, MetaMember};
use std::collections::{BTreeMap, BTreeSet};

/// A loaded (or referenced) class and its members
#[derive(Debug, Clone, PartialEq)]
pub struct MetaClass {
    fq_name: String,
    // keyed by "name descriptor"
    members: BTreeMap<String, MetaMember>,
}

impl MetaClass {
    pub fn new(fq_name: impl Into<String>) -> Self {
        Self {
            fq_name: fq_name.into(),
            members: BTreeMap::new(),
        }
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    /// Package part of the name; empty for the default package
    pub fn package_name(&self) -> &str {
        self.fq_name
            .rfind('.')
            .map(|dot| &self.fq_name[..dot])
            .unwrap_or("")
    }

    pub fn simple_name(&self) -> &str {
        self.fq_name
            .rfind('.')
            .map(|dot| &self.fq_name[dot + 1..])
            .unwrap_or(&self.fq_name)
    }

    pub fn member(&self, member_key: &str) -> Option<&MetaMember> {
        self.members.get(member_key)
    }

    pub fn members(&self) -> impl Iterator<Item = &MetaMember> {
        self.members.values()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// All classes of the model, ordered by fully-qualified name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageManager {
    classes: BTreeMap<String, MetaClass>,
}

impl PackageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. Returns false if it was already known.
    pub fn add_class(&mut self, fq_name: &str) -> bool {
        if self.classes.contains_key(fq_name) {
            return false;
        }
        self.classes
            .insert(fq_name.to_string(), MetaClass::new(fq_name));
        true
    }

    pub fn class(&self, fq_name: &str) -> Option<&MetaClass> {
        self.classes.get(fq_name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &MetaClass> {
        self.classes.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn member(&self, signature: &MemberSignature) -> Option<&MetaMember> {
        self.classes
            .get(&signature.class_name)?
            .members
            .get(&signature.member_key())
    }

    pub fn member_mut(&mut self, signature: &MemberSignature) -> Option<&mut MetaMember> {
        self.classes
            .get_mut(&signature.class_name)?
            .members
            .get_mut(&signature.member_key())
    }

    /// Look up a member, creating it (and its class) on first reference
    pub fn member_mut_or_insert(&mut self, signature: &MemberSignature) -> &mut MetaMember {
        self.classes
            .entry(signature.class_name.clone())
            .or_insert_with(|| MetaClass::new(signature.class_name.clone()))
            .members
            .entry(signature.member_key())
            .or_insert_with(|| MetaMember::new(signature.clone()))
    }

    pub fn members(&self) -> impl Iterator<Item = &MetaMember> {
        self.classes.values().flat_map(|c| c.members.values())
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut MetaMember> {
        self.classes
            .values_mut()
            .flat_map(|c| c.members.values_mut())
    }

    pub fn member_count(&self) -> usize {
        self.classes.values().map(|c| c.members.len()).sum()
    }

    /// Distinct package names, sorted
    pub fn package_names(&self) -> BTreeSet<&str> {
        self.classes.values().map(MetaClass::package_name).collect()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }
}
