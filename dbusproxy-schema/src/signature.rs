//! D-Bus type signature parsing.
//!
//! Converts a signature string holding one complete type into a
//! [`SignatureType`] tree that the resolver can walk.

use crate::error::ParseError;

/// One complete D-Bus type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureType {
    /// Basic type identified by its type code (`y`, `b`, `s`, ...).
    Basic(char),
    /// Variant (`v`).
    Variant,
    /// Array of an element type (`aX`).
    Array(Box<SignatureType>),
    /// Dictionary (`a{KV}`).
    Dict(Box<SignatureType>, Box<SignatureType>),
    /// Struct (`(...)`).
    Struct(Vec<SignatureType>),
}

impl SignatureType {
    /// Parses a signature holding exactly one complete type.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidSignature` if the signature is empty,
    /// malformed, or holds more than one complete type.
    pub fn parse(signature: &str) -> Result<Self, ParseError> {
        let chars: Vec<char> = signature.chars().collect();
        let mut pos = 0;
        let parsed = parse_single(&chars, &mut pos, signature, Nesting::default())?;
        if pos != chars.len() {
            return Err(ParseError::invalid_signature(
                signature,
                "trailing characters after complete type",
            ));
        }
        Ok(parsed)
    }

    /// Returns true for basic (non-container, non-variant) types.
    #[must_use]
    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    /// Renders the type back to its signature string.
    #[must_use]
    pub fn to_signature(&self) -> String {
        match self {
            Self::Basic(c) => c.to_string(),
            Self::Variant => "v".to_string(),
            Self::Array(elem) => format!("a{}", elem.to_signature()),
            Self::Dict(k, v) => format!("a{{{}{}}}", k.to_signature(), v.to_signature()),
            Self::Struct(fields) => {
                let inner: String = fields.iter().map(Self::to_signature).collect();
                format!("({})", inner)
            }
        }
    }
}

/// Basic type codes accepted by the parser.
const BASIC_CODES: &str = "ybnqiuxtdsogh";

/// Maximum array nesting allowed by the D-Bus wire format.
pub const MAX_ARRAY_DEPTH: usize = 32;

/// Maximum struct nesting allowed by the D-Bus wire format.
pub const MAX_STRUCT_DEPTH: usize = 32;

/// Container depth reached at the current position.
#[derive(Debug, Clone, Copy, Default)]
struct Nesting {
    arrays: usize,
    structs: usize,
}

impl Nesting {
    fn array(self, signature: &str) -> Result<Self, ParseError> {
        if self.arrays >= MAX_ARRAY_DEPTH {
            return Err(ParseError::invalid_signature(
                signature,
                format!("arrays nested deeper than {}", MAX_ARRAY_DEPTH),
            ));
        }
        Ok(Self {
            arrays: self.arrays + 1,
            ..self
        })
    }

    fn structure(self, signature: &str) -> Result<Self, ParseError> {
        if self.structs >= MAX_STRUCT_DEPTH {
            return Err(ParseError::invalid_signature(
                signature,
                format!("structs nested deeper than {}", MAX_STRUCT_DEPTH),
            ));
        }
        Ok(Self {
            structs: self.structs + 1,
            ..self
        })
    }
}

fn parse_single(
    chars: &[char],
    pos: &mut usize,
    signature: &str,
    nesting: Nesting,
) -> Result<SignatureType, ParseError> {
    let Some(&c) = chars.get(*pos) else {
        return Err(ParseError::invalid_signature(
            signature,
            "expected a complete type",
        ));
    };
    *pos += 1;

    match c {
        'v' => Ok(SignatureType::Variant),
        'a' => {
            let nesting = nesting.array(signature)?;
            if chars.get(*pos) == Some(&'{') {
                *pos += 1;
                let key = parse_single(chars, pos, signature, nesting)?;
                if !key.is_basic() {
                    return Err(ParseError::invalid_signature(
                        signature,
                        "dictionary key must be a basic type",
                    ));
                }
                let value = parse_single(chars, pos, signature, nesting)?;
                if chars.get(*pos) != Some(&'}') {
                    return Err(ParseError::invalid_signature(
                        signature,
                        "dictionary entry must hold exactly two types",
                    ));
                }
                *pos += 1;
                Ok(SignatureType::Dict(Box::new(key), Box::new(value)))
            } else {
                let elem = parse_single(chars, pos, signature, nesting)?;
                Ok(SignatureType::Array(Box::new(elem)))
            }
        }
        '(' => {
            let nesting = nesting.structure(signature)?;
            let mut fields = Vec::new();
            loop {
                match chars.get(*pos) {
                    Some(')') => {
                        *pos += 1;
                        break;
                    }
                    Some(_) => fields.push(parse_single(chars, pos, signature, nesting)?),
                    None => {
                        return Err(ParseError::invalid_signature(
                            signature,
                            "unterminated struct",
                        ));
                    }
                }
            }
            if fields.is_empty() {
                return Err(ParseError::invalid_signature(signature, "empty struct"));
            }
            Ok(SignatureType::Struct(fields))
        }
        '{' => Err(ParseError::invalid_signature(
            signature,
            "dictionary entry outside an array",
        )),
        c if BASIC_CODES.contains(c) => Ok(SignatureType::Basic(c)),
        c => Err(ParseError::invalid_signature(
            signature,
            format!("unknown type code '{}'", c),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        assert_eq!(SignatureType::parse("u").unwrap(), SignatureType::Basic('u'));
        assert_eq!(SignatureType::parse("v").unwrap(), SignatureType::Variant);
    }

    #[test]
    fn test_parse_nested_containers() {
        let parsed = SignatureType::parse("a{sa(uv)}").expect("Failed to parse");
        assert_eq!(
            parsed,
            SignatureType::Dict(
                Box::new(SignatureType::Basic('s')),
                Box::new(SignatureType::Array(Box::new(SignatureType::Struct(vec![
                    SignatureType::Basic('u'),
                    SignatureType::Variant,
                ])))),
            )
        );
        assert_eq!(parsed.to_signature(), "a{sa(uv)}");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "uu", "a", "(u", "()", "{su}", "a{vs}", "a{sus}", "z"] {
            assert!(
                SignatureType::parse(bad).is_err(),
                "signature {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_nesting_limits() {
        let deepest_array = format!("{}u", "a".repeat(MAX_ARRAY_DEPTH));
        assert!(SignatureType::parse(&deepest_array).is_ok());

        let too_deep_array = format!("{}u", "a".repeat(MAX_ARRAY_DEPTH + 1));
        assert!(matches!(
            SignatureType::parse(&too_deep_array),
            Err(ParseError::InvalidSignature { .. })
        ));

        let deepest_struct = format!(
            "{}u{}",
            "(".repeat(MAX_STRUCT_DEPTH),
            ")".repeat(MAX_STRUCT_DEPTH)
        );
        assert!(SignatureType::parse(&deepest_struct).is_ok());

        let too_deep_struct = format!(
            "{}u{}",
            "(".repeat(MAX_STRUCT_DEPTH + 1),
            ")".repeat(MAX_STRUCT_DEPTH + 1)
        );
        assert!(SignatureType::parse(&too_deep_struct).is_err());

        // Dictionaries count as arrays.
        let dicts = format!(
            "{}u{}",
            "a{s".repeat(MAX_ARRAY_DEPTH + 1),
            "}".repeat(MAX_ARRAY_DEPTH + 1)
        );
        assert!(SignatureType::parse(&dicts).is_err());
    }

    #[test]
    fn test_parse_huge_nesting_is_rejected() {
        let hostile = format!("{}u", "a".repeat(500_000));
        assert!(SignatureType::parse(&hostile).is_err());
    }
}
