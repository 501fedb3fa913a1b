/// The 27 Brazilian federative units accepted in the `uf` field, in the
/// order the selector cycles through them.
pub const STATE_CODES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Canonical form of a state code, if it is one of [`STATE_CODES`].
pub fn normalize(code: &str) -> Option<&'static str> {
    let upper = code.trim().to_ascii_uppercase();
    STATE_CODES.iter().copied().find(|c| *c == upper)
}
