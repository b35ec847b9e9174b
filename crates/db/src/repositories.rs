pub mod appointment;
pub mod client;
pub mod employee;
pub mod pet;
pub mod waiting_room;

/// `ILIKE` pattern matching `term` anywhere, with the wildcards and the
/// escape character in `term` taken literally. Use with `ESCAPE '\'`.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
