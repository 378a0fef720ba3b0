//! Symbol mangling for runtime type information and class members.
//!
//! Every symbol the backend emits for a class is derived from the class's
//! binary name, so separately compiled units agree on names without
//! coordinating.
//!
//! # Mangling Scheme
//!
//! ```text
//! _kiln_<kind>$<binary>[$$<member>]
//! ```
//!
//! Where:
//! - `_kiln_` is the prefix identifying Kiln symbols
//! - `<kind>` tags what the symbol is (see [`SymbolKind`])
//! - `<binary>` is the encoded binary name of the class
//! - `<member>` is the encoded method or field name, for member symbols
//!
//! Encoding keeps ASCII alphanumerics and `_`; every other character is
//! escaped as `$xx` (ASCII) or `$uXXXXXX` (anything else). An escape never
//! begins with `$`, so `$$` only ever separates the member. The scheme is
//! injective: distinct inputs never share a symbol.
//!
//! # Examples
//!
//! | Entity | Mangled Name |
//! |--------|--------------|
//! | identity cell of `pkg.A` | `_kiln_cid$pkg$2eA` |
//! | descriptor of `Outer$Inner` | `_kiln_cobj$Outer$24Inner` |
//! | method `run` of `A` | `_kiln_m$A$$run` |

use std::fmt::Write;

/// The prefix for all Kiln mangled symbols.
pub const MANGLE_PREFIX: &str = "_kiln_";

/// Separator between the kind tag and the binary name.
const KIND_SEP: char = '$';

/// Separator between the binary name and the member name.
const MEMBER_SEP: &str = "$$";

/// What a mangled symbol names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// The one-byte identity cell of a type.
    ClassId,
    /// The class-object descriptor of a type.
    ClassObject,
    Method,
    StaticField,
    /// The static initializer of a class.
    StaticInit,
}

impl SymbolKind {
    const ALL: [SymbolKind; 5] = [
        SymbolKind::ClassId,
        SymbolKind::ClassObject,
        SymbolKind::Method,
        SymbolKind::StaticField,
        SymbolKind::StaticInit,
    ];

    fn tag(self) -> &'static str {
        match self {
            SymbolKind::ClassId => "cid",
            SymbolKind::ClassObject => "cobj",
            SymbolKind::Method => "m",
            SymbolKind::StaticField => "sf",
            SymbolKind::StaticInit => "clinit",
        }
    }

    fn has_member(self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::StaticField)
    }
}

/// Symbol mangler for generating unique linker names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mangler;

impl Mangler {
    #[must_use]
    pub fn new() -> Self {
        Mangler
    }

    /// Symbol of the identity cell for the type with this binary name.
    #[must_use]
    pub fn class_id_name(&self, binary_name: &str) -> String {
        self.mangle(SymbolKind::ClassId, binary_name, None)
    }

    /// Symbol of the class-object descriptor.
    #[must_use]
    pub fn class_obj_name(&self, binary_name: &str) -> String {
        self.mangle(SymbolKind::ClassObject, binary_name, None)
    }

    #[must_use]
    pub fn method_name(&self, binary_name: &str, method: &str) -> String {
        self.mangle(SymbolKind::Method, binary_name, Some(method))
    }

    #[must_use]
    pub fn static_field_name(&self, binary_name: &str, field: &str) -> String {
        self.mangle(SymbolKind::StaticField, binary_name, Some(field))
    }

    #[must_use]
    pub fn static_init_name(&self, binary_name: &str) -> String {
        self.mangle(SymbolKind::StaticInit, binary_name, None)
    }

    #[allow(clippy::unused_self)]
    fn mangle(&self, kind: SymbolKind, binary_name: &str, member: Option<&str>) -> String {
        let mut result = String::with_capacity(64);
        result.push_str(MANGLE_PREFIX);
        result.push_str(kind.tag());
        result.push(KIND_SEP);
        encode_identifier(&mut result, binary_name);
        if let Some(member) = member {
            result.push_str(MEMBER_SEP);
            encode_identifier(&mut result, member);
        }
        result
    }
}

fn encode_identifier(out: &mut String, name: &str) {
    for c in name.chars() {
        match c {
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            c if c.is_ascii() => {
                let _ = write!(out, "${:02x}", c as u32);
            }
            c => {
                let _ = write!(out, "$u{:06x}", c as u32);
            }
        }
    }
}

/// A decoded Kiln symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Demangled {
    pub kind: SymbolKind,
    pub binary_name: String,
    pub member: Option<String>,
}

/// Decode a Kiln symbol; `None` for anything the mangler cannot produce.
pub fn demangle(symbol: &str) -> Option<Demangled> {
    let rest = symbol.strip_prefix(MANGLE_PREFIX)?;
    let (tag, encoded) = rest.split_once(KIND_SEP)?;
    let kind = SymbolKind::ALL.into_iter().find(|k| k.tag() == tag)?;

    let (binary_name, tail) = decode_identifier(encoded)?;
    let member = match tail {
        None => None,
        Some(member) => {
            let (member, more) = decode_identifier(member)?;
            if more.is_some() {
                return None;
            }
            Some(member)
        }
    };
    if member.is_some() != kind.has_member() {
        return None;
    }

    Some(Demangled {
        kind,
        binary_name,
        member,
    })
}

/// Decode up to a `$$` separator; returns the text after it, if any.
fn decode_identifier(encoded: &str) -> Option<(String, Option<&str>)> {
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '$' {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                return None;
            }
            out.push(c);
            continue;
        }
        let rest = &encoded[i + 1..];
        let (digits, width) = match rest.as_bytes().first()? {
            b'$' => return Some((out, Some(&encoded[i + 2..]))),
            b'u' => (rest.get(1..7)?, 7),
            _ => (rest.get(..2)?, 2),
        };
        if !digits.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return None;
        }
        let decoded = char::from_u32(u32::from_str_radix(digits, 16).ok()?)?;
        // Only the canonical escape for each character is accepted.
        let canonical = if width == 2 {
            decoded.is_ascii() && !(decoded.is_ascii_alphanumeric() || decoded == '_')
        } else {
            !decoded.is_ascii()
        };
        if !canonical {
            return None;
        }
        out.push(decoded);
        for _ in 0..width {
            chars.next();
        }
    }
    Some((out, None))
}
