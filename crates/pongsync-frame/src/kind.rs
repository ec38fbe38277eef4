//! Envelope kinds.

/// UTF-8 JSON payload.
pub const TEXT: u8 = 0x1;

/// Raw binary payload.
pub const BINARY: u8 = 0x2;

/// Returns a human-readable name for an envelope kind.
pub fn kind_name(kind: u8) -> &'static str {
    match kind {
        TEXT => "TEXT",
        BINARY => "BINARY",
        _ => "UNKNOWN",
    }
}

/// Returns true if the kind is one this crate can decode.
pub fn is_known(kind: u8) -> bool {
    matches!(kind, TEXT | BINARY)
}
