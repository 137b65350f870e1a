//! Construct locators.
//!
//! All locators search in source order and return the first match.

use crate::analysis::{Declaration, DeclarationKind, FileFacts};

/// Split `Receiver.Name`; the name is everything after the last dot.
fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
        .filter(|(recv, base)| !recv.is_empty() && !base.is_empty())
}

/// Receiver comparison ignores a pointer marker on either side; Go rejects
/// a type that has both `(T).F` and `(*T).F`.
fn receiver_matches(decl: &Declaration, receiver: &str) -> bool {
    match decl.receiver.as_deref() {
        Some(r) if r == receiver => true,
        Some(_) => decl.receiver_base() == Some(receiver.trim_start_matches('*')),
        None => false,
    }
}

fn method_on<'a>(facts: &'a FileFacts, receiver: &str, name: &str) -> Option<&'a Declaration> {
    facts
        .declarations_by_kind(DeclarationKind::Method)
        .find(|d| d.name == name && receiver_matches(d, receiver))
}

/// Plain functions by bare name; methods only through `Receiver.Name`.
pub fn function<'a>(
    facts: &'a FileFacts,
    _kind: DeclarationKind,
    name: &str,
) -> Option<&'a Declaration> {
    match split_qualified(name) {
        Some((receiver, base)) => method_on(facts, receiver, base),
        None => facts
            .declarations_by_kind(DeclarationKind::Function)
            .find(|d| d.name == name),
    }
}

/// Methods by `Receiver.Name`, or the first method with a bare name.
pub fn method<'a>(
    facts: &'a FileFacts,
    _kind: DeclarationKind,
    name: &str,
) -> Option<&'a Declaration> {
    match split_qualified(name) {
        Some((receiver, base)) => method_on(facts, receiver, base),
        None => facts
            .declarations_by_kind(DeclarationKind::Method)
            .find(|d| d.name == name),
    }
}

/// Any declaration of `kind` that declares `name`, including group members.
pub fn by_member<'a>(
    facts: &'a FileFacts,
    kind: DeclarationKind,
    name: &str,
) -> Option<&'a Declaration> {
    facts.declarations_by_kind(kind).find(|d| d.declares(name))
}
