//! Block-letter masthead for the home screen.

const ROWS: usize = 5;

type Glyph = [&'static str; ROWS];

/// Glyphs cover the masthead text; anything else renders as a gap.
fn glyph(ch: char) -> Option<Glyph> {
    let glyph = match ch.to_ascii_uppercase() {
        'A' => [" ██ ", "█  █", "████", "█  █", "█  █"],
        'B' => ["███ ", "█  █", "███ ", "█  █", "███ "],
        'C' => [" ███", "█   ", "█   ", "█   ", " ███"],
        'D' => ["███ ", "█  █", "█  █", "█  █", "███ "],
        'K' => ["█  █", "█ █ ", "██  ", "█ █ ", "█  █"],
        'O' => [" ██ ", "█  █", "█  █", "█  █", " ██ "],
        'R' => ["███ ", "█  █", "███ ", "█ █ ", "█  █"],
        ' ' => ["    ", "    ", "    ", "    ", "    "],
        _ => return None,
    };
    Some(glyph)
}

/// Render text as block-letter rows, one string per row.
pub fn render(text: &str) -> Vec<String> {
    let mut rows = vec![String::new(); ROWS];
    for ch in text.chars() {
        let Some(glyph) = glyph(ch) else {
            continue;
        };
        for (row, part) in rows.iter_mut().zip(glyph.iter()) {
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(part);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_row_count() {
        let rows = render("CORKBOARD");
        assert_eq!(rows.len(), ROWS);
        let width = rows[0].chars().count();
        assert!(rows.iter().all(|row| row.chars().count() == width));
    }

    #[test]
    fn unknown_characters_are_skipped() {
        assert_eq!(render("!!!"), vec![String::new(); ROWS]);
    }
}
