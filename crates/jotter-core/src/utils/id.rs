use crate::utils::time;

/// Generate a unique id for a locally created note.
///
/// The millisecond timestamp prefix keeps ids roughly ordered by
/// creation time; the nanoid suffix makes same-millisecond collisions
/// practically impossible.
pub fn generate_note_id() -> String {
    format!("{}-{}", time::now_millis(), nanoid::nanoid!(8))
}
