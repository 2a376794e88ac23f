use crate::error::PatternError;

/// Largest `x * y` an RLE header may declare.
pub const MAX_PATTERN_AREA: usize = 1 << 24;

/// A pattern read from text, as (row, col) offsets from its top-left corner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedPattern {
    pub name: Option<String>,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<(i64, i64)>,
}

impl ParsedPattern {
    /// Flat alternating row/col list for `Universe::cells_from_pattern`.
    pub fn coords(&self) -> Vec<i64> {
        self.cells.iter().flat_map(|&(r, c)| [r, c]).collect()
    }
}

/// Parse either format. RLE is recognized by its `x = ..` header.
pub fn parse_pattern(text: &str) -> Result<ParsedPattern, PatternError> {
    let first = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('!'));
    match first {
        Some(l) if l.starts_with('x') => parse_rle(text),
        _ => parse_plaintext(text),
    }
}

/// Life RLE: `#` comment lines, an `x = W, y = H[, rule = B3/S23]` header, then runs of
/// `b` (dead), `o` (alive) and `$` (end of row), terminated by `!`.
pub fn parse_rle(text: &str) -> Result<ParsedPattern, PatternError> {
    let mut name = None;
    let mut body = Vec::new();
    let mut header = None;
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("#N") {
            name = Some(rest.trim().to_string());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if header.is_none() {
            header = Some(parse_header(line)?);
        } else {
            body.push((n + 1, line));
        }
    }
    let (width, height) = header.ok_or(PatternError::MissingHeader)?;

    let mut cells = Vec::new();
    let (mut row, mut col, mut count) = (0usize, 0usize, 0usize);
    'outer: for (line_no, line) in body {
        let too_long = || PatternError::RunTooLong { line: line_no };
        for ch in line.chars() {
            let run = count.max(1);
            match ch {
                '0'..='9' => {
                    let digit = ch as usize - '0' as usize;
                    count = count
                        .checked_mul(10)
                        .and_then(|c| c.checked_add(digit))
                        .ok_or_else(too_long)?;
                    continue;
                }
                'b' | '.' => col = col.checked_add(run).ok_or_else(too_long)?,
                'o' | 'A' => {
                    let end = col.checked_add(run).ok_or_else(too_long)?;
                    if end > width || row >= height {
                        let col = if row >= height { col } else { col.max(width) };
                        return Err(PatternError::OutOfBounds { row, col });
                    }
                    cells.extend((col..end).map(|c| (row as i64, c as i64)));
                    col = end;
                }
                '$' => {
                    row = row.checked_add(run).ok_or_else(too_long)?;
                    col = 0;
                }
                '!' => break 'outer,
                c if c.is_whitespace() => continue,
                ch => return Err(PatternError::InvalidChar { ch, line: line_no }),
            }
            count = 0;
        }
    }

    Ok(ParsedPattern {
        name,
        width,
        height,
        cells,
    })
}

fn parse_header(line: &str) -> Result<(usize, usize), PatternError> {
    let invalid = || PatternError::InvalidHeader(line.to_string());
    let mut width = None;
    let mut height = None;
    for part in line.split(',') {
        let (key, value) = part.split_once('=').ok_or_else(invalid)?;
        let value = value.trim();
        match key.trim() {
            "x" => width = Some(value.parse::<usize>().map_err(|_| invalid())?),
            "y" => height = Some(value.parse::<usize>().map_err(|_| invalid())?),
            "rule" => {
                let rule = value.to_ascii_uppercase();
                if rule != "B3/S23" && rule != "23/3" {
                    return Err(PatternError::UnsupportedRule(value.to_string()));
                }
            }
            _ => return Err(invalid()),
        }
    }
    match (width, height) {
        (Some(w), Some(h)) if w.checked_mul(h).is_some_and(|a| a <= MAX_PATTERN_AREA) => Ok((w, h)),
        (Some(width), Some(height)) => Err(PatternError::TooLarge { width, height }),
        _ => Err(invalid()),
    }
}

/// Plaintext: `!` comment lines (`!Name: ..` sets the name), then one line per row with
/// `.` for dead and `O` or `*` for alive.
pub fn parse_plaintext(text: &str) -> Result<ParsedPattern, PatternError> {
    let mut name = None;
    let mut cells = Vec::new();
    let mut width = 0;
    let mut row = 0usize;
    for (n, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if let Some(comment) = line.strip_prefix('!') {
            if let Some(rest) = comment.strip_prefix("Name:") {
                name = Some(rest.trim().to_string());
            }
            continue;
        }
        let mut len = 0;
        for (col, ch) in line.chars().enumerate() {
            match ch {
                '.' => {}
                'O' | '*' => cells.push((row as i64, col as i64)),
                ch => return Err(PatternError::InvalidChar { ch, line: n + 1 }),
            }
            len = col + 1;
        }
        width = width.max(len);
        row += 1;
    }

    Ok(ParsedPattern {
        name,
        width,
        height: row,
        cells,
    })
}
