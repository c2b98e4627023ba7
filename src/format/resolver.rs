use crate::{Error, ErrorKind, FileFormat, FormatError};

/// A fixed byte pattern expected at a fixed offset in the raw file
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    offset: usize,
    bytes: Vec<u8>,
}

impl Marker {
    /// Expect `bytes` at `offset` from the start of the file
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Marker {
        Marker {
            offset,
            bytes: bytes.into(),
        }
    }

    fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len())
            .map(|window| window == self.bytes.as_slice())
            .unwrap_or(false)
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug)]
struct DetectionRule {
    format: FileFormat,
    markers: Vec<Marker>,
}

impl DetectionRule {
    /// Total marker bytes matched, or `None` if any marker misses
    fn specificity(&self, data: &[u8]) -> Option<usize> {
        let mut matched = 0;
        for marker in &self.markers {
            if !marker.matches(data) {
                return None;
            }
            matched += marker.len();
        }
        Some(matched)
    }
}

/// Sniffs raw bytes to identify which [FileFormat] produced them.
///
/// Variants of the same game frequently share the outer container shape and
/// differ only in a handful of known byte markers: a magic constant, the
/// offset at which the script block's `SCR\0` tag lands, a region byte inside
/// simple vars. A resolver holds one rule per candidate format; each rule
/// lists the markers that must all be present.
///
/// Resolution picks the matching rule with the most marker bytes (the most
/// specific match), so a rule that checks everything a sibling checks plus an
/// extra discriminator wins over the sibling. No rule matching is an
/// [`UnrecognizedFormat`](crate::ErrorKind::UnrecognizedFormat) error; there
/// is deliberately no fallback format.
///
/// ```
/// use ganton::{FileFormat, FormatResolver, Marker};
///
/// let pc = FileFormat::builder("PC", "PC retail").build();
/// let mut resolver = FormatResolver::new();
/// resolver.register(pc, vec![Marker::new(0xEC, *b"SCR\0")]);
///
/// let mut data = vec![0u8; 0x100];
/// data[0xEC..0xF0].copy_from_slice(b"SCR\0");
/// assert_eq!(resolver.resolve(&data).unwrap().name(), "PC");
///
/// assert!(resolver.resolve(&[0u8; 0x100]).is_err());
/// ```
#[derive(Debug, Default)]
pub struct FormatResolver {
    rules: Vec<DetectionRule>,
}

impl FormatResolver {
    /// Creates an empty resolver
    pub fn new() -> FormatResolver {
        FormatResolver::default()
    }

    /// Add a candidate format and the markers that identify it
    pub fn register(&mut self, format: FileFormat, markers: Vec<Marker>) {
        self.rules.push(DetectionRule { format, markers });
    }

    /// The registered candidate formats, in registration order
    pub fn formats(&self) -> impl Iterator<Item = &FileFormat> {
        self.rules.iter().map(|rule| &rule.format)
    }

    /// Identify the format of the given raw bytes.
    ///
    /// Ties between equally specific rules go to the earlier registration.
    pub fn resolve(&self, data: &[u8]) -> Result<&FileFormat, Error> {
        let mut best: Option<(usize, &FileFormat)> = None;
        for rule in &self.rules {
            if let Some(specificity) = rule.specificity(data) {
                let better = match best {
                    Some((seen, _)) => specificity > seen,
                    None => true,
                };
                if better {
                    best = Some((specificity, &rule.format));
                }
            }
        }

        best.map(|(_, format)| format)
            .ok_or_else(|| Error::new(ErrorKind::UnrecognizedFormat))
    }

    /// Identify the format and verify it matches the caller's expectation.
    ///
    /// Used when a caller already knows (or guesses) the variant: detection
    /// still runs, and a disagreement surfaces as a
    /// [`FormatMismatch`](crate::ErrorKind::FormatMismatch) instead of
    /// silently trusting either side. `UnrecognizedFormat` is reserved for
    /// bytes no rule matches at all.
    pub fn resolve_expected<'a>(
        &self,
        data: &[u8],
        expected: &'a FileFormat,
    ) -> Result<&'a FileFormat, Error> {
        let detected = self.resolve(data)?;
        if detected == expected {
            Ok(expected)
        } else {
            Err(FormatError::DetectionDisagreement {
                detected: detected.name().to_string(),
                expected: expected.name().to_string(),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(name: &str) -> FileFormat {
        FileFormat::builder(name, name).build()
    }

    #[test]
    fn test_no_rules_never_resolves() {
        let resolver = FormatResolver::new();
        let err = resolver.resolve(b"anything").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnrecognizedFormat));
    }

    #[test]
    fn test_all_markers_required() {
        let mut resolver = FormatResolver::new();
        resolver.register(
            format("A"),
            vec![Marker::new(0, *b"GS"), Marker::new(8, *b"SCR\0")],
        );

        let mut data = vec![0u8; 16];
        data[0..2].copy_from_slice(b"GS");
        assert!(resolver.resolve(&data).is_err());

        data[8..12].copy_from_slice(b"SCR\0");
        assert_eq!(resolver.resolve(&data).unwrap().name(), "A");
    }

    #[test]
    fn test_most_specific_match_wins() {
        // B checks everything A checks plus a discriminator byte
        let mut resolver = FormatResolver::new();
        resolver.register(format("A"), vec![Marker::new(4, *b"SCR\0")]);
        resolver.register(
            format("B"),
            vec![Marker::new(4, *b"SCR\0"), Marker::new(12, [0x01])],
        );

        let mut data = vec![0u8; 16];
        data[4..8].copy_from_slice(b"SCR\0");
        assert_eq!(resolver.resolve(&data).unwrap().name(), "A");

        data[12] = 0x01;
        assert_eq!(resolver.resolve(&data).unwrap().name(), "B");
    }

    #[test]
    fn test_ties_go_to_registration_order() {
        let mut resolver = FormatResolver::new();
        resolver.register(format("first"), vec![Marker::new(0, *b"GS")]);
        resolver.register(format("second"), vec![Marker::new(0, *b"GS")]);

        let data = b"GS......";
        assert_eq!(resolver.resolve(data).unwrap().name(), "first");
    }

    #[test]
    fn test_marker_past_end_is_a_miss() {
        let mut resolver = FormatResolver::new();
        resolver.register(format("A"), vec![Marker::new(0x100, *b"SCR\0")]);
        assert!(resolver.resolve(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_resolve_expected() {
        let mut resolver = FormatResolver::new();
        resolver.register(format("A"), vec![Marker::new(0, *b"A")]);
        resolver.register(format("B"), vec![Marker::new(0, *b"B")]);

        let a = format("A");
        assert!(resolver.resolve_expected(b"A...", &a).is_ok());

        // recognized as B while A was requested: a format mismatch, not an
        // unrecognized input
        let err = resolver.resolve_expected(b"B...", &a).unwrap_err();
        match err.kind() {
            ErrorKind::FormatMismatch(FormatError::DetectionDisagreement {
                detected,
                expected,
            }) => {
                assert_eq!(detected, "B");
                assert_eq!(expected, "A");
            }
            kind => panic!("unexpected error: {:?}", kind),
        }

        // bytes no rule matches stay UnrecognizedFormat
        let err = resolver.resolve_expected(b"C...", &a).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnrecognizedFormat));
    }
}
