use jiff::Timestamp;

/// One row as it sits in a table. All text columns are ciphertext; the
/// timestamp is the only plaintext column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRow {
    pub identity_ciphertext: String,
    pub status_ciphertext: String,
    pub attributes_ciphertext: String,
    pub timestamp: Timestamp,
}
