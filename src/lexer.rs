//! Rule-based lexical scanner for collection text
//!
//! Scans raw text into typed tokens using an ordered rule set: at each
//! position the rules below are tried in priority order and the first one
//! whose pattern matches wins. Several rules carry boundary conditions on
//! the character before or after the match, so the scanner keeps the raw
//! character buffer around rather than working on a token-at-a-time stream.
//!
//! Rule order (highest priority first): Label, Number, Apostrophized,
//! ApostropheCarry, Hyphenated, Word, Delimiter, Punctuation.

use tracing::warn;

/// Structural marker opening a document: `$DOC <external_id>`.
pub const DOC_MARKER: &str = "$DOC";
/// Structural marker opening a document title block.
pub const TITLE_MARKER: &str = "$TITLE";
/// Structural marker opening a document body.
pub const TEXT_MARKER: &str = "$TEXT";

/// Lexical token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A structural marker line prefix ($DOC, $TITLE, $TEXT)
    Label,
    /// Alphanumeric token containing at least one letter
    Word,
    /// Signed integer or decimal, not butting into a letter
    Number,
    /// Contraction-like unit kept whole (o'clock, year's, o'brien's)
    Apostrophized,
    /// Word + short apostrophe tail, rewritten with an inserted space
    /// so it splits into two sub-tokens (don't -> "don 't")
    ApostropheCarry,
    /// Two or three hyphen-joined segments (rock-n-roll)
    Hyphenated,
    /// One whitespace character
    Delimiter,
    /// Any other single character
    Punctuation,
}

/// One lexical token: its class and matched (possibly rewritten) text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Tokenize text into a lazy token stream (one pass per call).
pub fn tokenize(text: &str) -> Lexer {
    Lexer::new(text)
}

/// Restartable single-pass scanner over a text buffer.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

/// Word character in the rule patterns: Unicode alphanumeric or underscore.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn at(&self, i: usize) -> Option<char> {
        self.input.get(i).copied()
    }

    /// Character preceding the match start, for boundary conditions.
    fn behind(&self, pos: usize) -> Option<char> {
        if pos == 0 {
            None
        } else {
            self.at(pos - 1)
        }
    }

    /// End of the maximal word-character run starting at `from`.
    fn word_run(&self, from: usize) -> usize {
        let mut i = from;
        while matches!(self.at(i), Some(c) if is_word_char(c)) {
            i += 1;
        }
        i
    }

    /// End of the maximal ASCII digit run starting at `from`.
    fn digit_run(&self, from: usize) -> usize {
        let mut i = from;
        while matches!(self.at(i), Some(c) if c.is_ascii_digit()) {
            i += 1;
        }
        i
    }

    // --- rule matchers, one per token class -------------------------------

    fn match_label(&self, pos: usize) -> Option<usize> {
        for lit in [DOC_MARKER, TITLE_MARKER, TEXT_MARKER] {
            let len = lit.chars().count();
            if lit
                .chars()
                .enumerate()
                .all(|(k, c)| self.at(pos + k) == Some(c))
            {
                return Some(pos + len);
            }
        }
        None
    }

    /// `[+-]? (\d*\.\d+ | \d+)`, rejected when the digit run is immediately
    /// followed by a letter (so `3rd` falls through to Word). When the
    /// decimal form is rejected that way, an integer prefix before the dot
    /// can still match (`3.14x` lexes as Number(3), Punctuation, Word).
    fn match_number(&self, pos: usize) -> Option<usize> {
        let mut i = pos;
        if matches!(self.at(i), Some('+') | Some('-')) {
            i += 1;
        }
        let int_start = i;
        let int_end = self.digit_run(i);

        if self.at(int_end) == Some('.') {
            let frac_end = self.digit_run(int_end + 1);
            if frac_end > int_end + 1 && !self.letter_follows(frac_end) {
                return Some(frac_end);
            }
        }
        if int_end > int_start && !self.letter_follows(int_end) {
            return Some(int_end);
        }
        None
    }

    fn letter_follows(&self, i: usize) -> bool {
        matches!(self.at(i), Some(c) if c.is_ascii_alphabetic())
    }

    // The three apostrophized shapes, shared between the standalone rule and
    // the hyphenated-tail position. Each returns the structural match end;
    // the caller applies the boundary condition and alternation order.

    /// `\w'\w{3,}` (o'clock)
    fn apos_short_long(&self, t: usize) -> Option<usize> {
        if !matches!(self.at(t), Some(c) if is_word_char(c)) || self.at(t + 1) != Some('\'') {
            return None;
        }
        let end = self.word_run(t + 2);
        if end - (t + 2) >= 3 {
            Some(end)
        } else {
            None
        }
    }

    /// `\w+'[sS]` (year's)
    fn apos_possessive(&self, t: usize) -> Option<usize> {
        let r = self.word_run(t);
        if r == t || self.at(r) != Some('\'') {
            return None;
        }
        match self.at(r + 1) {
            Some('s') | Some('S') => Some(r + 2),
            _ => None,
        }
    }

    /// `\w'\w+'[sS]` (o'brien's)
    fn apos_double(&self, t: usize) -> Option<usize> {
        if !matches!(self.at(t), Some(c) if is_word_char(c)) || self.at(t + 1) != Some('\'') {
            return None;
        }
        let q = self.word_run(t + 2);
        if q == t + 2 || self.at(q) != Some('\'') {
            return None;
        }
        match self.at(q + 1) {
            Some('s') | Some('S') => Some(q + 2),
            _ => None,
        }
    }

    /// True when the character at `i` would break an apostrophized or
    /// hyphenated match boundary. `with_hyphen` adds `-` to the set.
    fn boundary_violated(&self, i: usize, with_hyphen: bool) -> bool {
        match self.at(i) {
            Some('\'') => true,
            Some('-') => with_hyphen,
            Some(c) => is_word_char(c),
            None => false,
        }
    }

    fn match_apostrophized(&self, pos: usize) -> Option<usize> {
        if let Some(prev) = self.behind(pos) {
            if prev == '\'' || is_word_char(prev) {
                return None;
            }
        }
        for form in [
            Self::apos_short_long,
            Self::apos_possessive,
            Self::apos_double,
        ] {
            if let Some(end) = form(self, pos) {
                if !self.boundary_violated(end, false) {
                    return Some(end);
                }
            }
        }
        None
    }

    /// `\w+'\w{1,2}` not preceded by an apostrophe. The matched text is
    /// rewritten with a space before the apostrophe, so the normalizer can
    /// split it into the head word and the short `'tail`.
    fn match_apostrophe_carry(&self, pos: usize) -> Option<(usize, String)> {
        if self.behind(pos) == Some('\'') {
            return None;
        }
        let r = self.word_run(pos);
        if r == pos || self.at(r) != Some('\'') {
            return None;
        }
        let t = self.word_run(r + 1);
        let tail_len = t - (r + 1);
        if !(1..=2).contains(&tail_len) || self.at(t) == Some('\'') {
            return None;
        }
        let head: String = self.input[pos..r].iter().collect();
        let tail: String = self.input[r..t].iter().collect();
        Some((t, format!("{} {}", head, tail)))
    }

    /// Tail of a hyphenated token: a plain word or any apostrophized shape,
    /// with hyphens added to the forbidden boundary set.
    fn match_hyphen_tail(&self, t: usize) -> Option<usize> {
        let r = self.word_run(t);
        if r > t && !self.boundary_violated(r, true) {
            return Some(r);
        }
        for form in [
            Self::apos_short_long,
            Self::apos_possessive,
            Self::apos_double,
        ] {
            if let Some(end) = form(self, t) {
                if !self.boundary_violated(end, true) {
                    return Some(end);
                }
            }
        }
        None
    }

    fn match_hyphenated(&self, pos: usize) -> Option<usize> {
        if matches!(self.behind(pos), Some('-') | Some('\'')) {
            return None;
        }
        let seg1 = self.word_run(pos);
        if seg1 == pos || self.at(seg1) != Some('-') {
            return None;
        }
        // Two-part shape: word- tail
        if let Some(end) = self.match_hyphen_tail(seg1 + 1) {
            return Some(end);
        }
        // Three-part shape: word- mid(1-2)- tail
        let mid = self.word_run(seg1 + 1);
        let mid_len = mid - (seg1 + 1);
        if (1..=2).contains(&mid_len) && self.at(mid) == Some('-') {
            if let Some(end) = self.match_hyphen_tail(mid + 1) {
                return Some(end);
            }
        }
        None
    }

    /// `\d*[A-Za-z]+[0-9A-Za-z]*` — any ASCII alphanumeric run containing
    /// at least one letter (O2, 3rd, LA010189).
    fn match_word(&self, pos: usize) -> Option<usize> {
        let mut i = pos;
        while matches!(self.at(i), Some(c) if c.is_ascii_digit()) {
            i += 1;
        }
        let letters_start = i;
        while matches!(self.at(i), Some(c) if c.is_ascii_alphabetic()) {
            i += 1;
        }
        if i == letters_start {
            return None;
        }
        while matches!(self.at(i), Some(c) if c.is_ascii_alphanumeric()) {
            i += 1;
        }
        Some(i)
    }

    fn slice(&self, from: usize, to: usize) -> String {
        self.input[from..to].iter().collect()
    }

    /// Try every rule in priority order at `pos`. Returns the token and the
    /// position after it.
    fn scan_at(&self, pos: usize) -> Option<(Token, usize)> {
        if let Some(end) = self.match_label(pos) {
            return Some((Token::new(TokenKind::Label, self.slice(pos, end)), end));
        }
        if let Some(end) = self.match_number(pos) {
            return Some((Token::new(TokenKind::Number, self.slice(pos, end)), end));
        }
        if let Some(end) = self.match_apostrophized(pos) {
            return Some((
                Token::new(TokenKind::Apostrophized, self.slice(pos, end)),
                end,
            ));
        }
        if let Some((end, rewritten)) = self.match_apostrophe_carry(pos) {
            return Some((Token::new(TokenKind::ApostropheCarry, rewritten), end));
        }
        if let Some(end) = self.match_hyphenated(pos) {
            return Some((Token::new(TokenKind::Hyphenated, self.slice(pos, end)), end));
        }
        if let Some(end) = self.match_word(pos) {
            return Some((Token::new(TokenKind::Word, self.slice(pos, end)), end));
        }
        let c = self.at(pos)?;
        if c.is_whitespace() {
            return Some((Token::new(TokenKind::Delimiter, c.to_string()), pos + 1));
        }
        Some((Token::new(TokenKind::Punctuation, c.to_string()), pos + 1))
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.position < self.input.len() {
            match self.scan_at(self.position) {
                Some((token, end)) => {
                    self.position = end;
                    return Some(token);
                }
                None => {
                    // No rule matched (the catch-all makes this unreachable
                    // for any char, but a broken rule change would land here):
                    // report and resynchronize at the next character.
                    warn!(
                        position = self.position,
                        "uncaptured input character, skipping"
                    );
                    self.position += 1;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(TokenKind, String)> {
        tokenize(text).map(|t| (t.kind, t.text)).collect()
    }

    fn single(text: &str) -> Token {
        let toks: Vec<Token> = tokenize(text).collect();
        assert_eq!(toks.len(), 1, "expected one token for {:?}, got {:?}", text, toks);
        toks.into_iter().next().unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(single("$DOC").kind, TokenKind::Label);
        assert_eq!(single("$TITLE").kind, TokenKind::Label);
        assert_eq!(single("$TEXT").kind, TokenKind::Label);
    }

    #[test]
    fn test_doc_marker_line() {
        let toks = kinds("$DOC LA010189-0001");
        assert_eq!(toks[0], (TokenKind::Label, "$DOC".to_string()));
        assert_eq!(toks[1].0, TokenKind::Delimiter);
        // hyphen-joined id matches the Hyphenated rule before Word can fire
        assert_eq!(toks[2], (TokenKind::Hyphenated, "LA010189-0001".to_string()));
        assert_eq!(toks.len(), 3);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(single("42").kind, TokenKind::Number);
        assert_eq!(single("3.14").kind, TokenKind::Number);
        assert_eq!(single("-17").kind, TokenKind::Number);
        assert_eq!(single("+.5").kind, TokenKind::Number);
    }

    #[test]
    fn test_number_followed_by_letter_is_word() {
        let tok = single("3rd");
        assert_eq!(tok.kind, TokenKind::Word);
        assert_eq!(tok.text, "3rd");

        let tok = single("O2");
        assert_eq!(tok.kind, TokenKind::Word);
    }

    #[test]
    fn test_decimal_rejected_integer_prefix_survives() {
        // 1.5e3: the decimal form butts into "e", but the integer "1" does not
        let toks = kinds("1.5e3");
        assert_eq!(toks[0], (TokenKind::Number, "1".to_string()));
        assert_eq!(toks[1].0, TokenKind::Punctuation);
        assert_eq!(toks[2], (TokenKind::Word, "5e3".to_string()));
    }

    #[test]
    fn test_apostrophized_forms() {
        for text in ["o'clock", "it's", "year's", "cats'S", "o'brien's"] {
            let tok = single(text);
            assert_eq!(tok.kind, TokenKind::Apostrophized, "for {:?}", text);
            assert_eq!(tok.text, text);
        }
    }

    #[test]
    fn test_apostrophe_carry_rewrites() {
        let tok = single("don't");
        assert_eq!(tok.kind, TokenKind::ApostropheCarry);
        assert_eq!(tok.text, "don 't");

        let tok = single("ab'c");
        assert_eq!(tok.kind, TokenKind::ApostropheCarry);
        assert_eq!(tok.text, "ab 'c");
    }

    #[test]
    fn test_trailing_apostrophe_is_punctuation() {
        // cats' has nothing after the apostrophe, so no apostrophe rule fires
        let toks = kinds("cats'");
        assert_eq!(toks[0], (TokenKind::Word, "cats".to_string()));
        assert_eq!(toks[1].0, TokenKind::Punctuation);
    }

    #[test]
    fn test_hyphenated() {
        let tok = single("rock-n-roll");
        assert_eq!(tok.kind, TokenKind::Hyphenated);

        let tok = single("well-known");
        assert_eq!(tok.kind, TokenKind::Hyphenated);

        // three parts with a two-character middle
        let tok = single("mother-in-law");
        assert_eq!(tok.kind, TokenKind::Hyphenated);

        // possessive tail
        let tok = single("x-ray's");
        assert_eq!(tok.kind, TokenKind::Hyphenated);
    }

    #[test]
    fn test_hyphenated_long_middle_falls_apart() {
        // middle segment longer than 2 chars breaks the three-part shape
        let toks = kinds("state-of-the-art");
        assert_eq!(toks[0], (TokenKind::Word, "state".to_string()));
        assert_eq!(toks[1].0, TokenKind::Punctuation);
    }

    #[test]
    fn test_stray_hyphen_boundary() {
        // trailing hyphen cancels the hyphenated match
        let toks = kinds("semi-");
        assert_eq!(toks[0], (TokenKind::Word, "semi".to_string()));
        assert_eq!(toks[1].0, TokenKind::Punctuation);
    }

    #[test]
    fn test_delimiters_and_punctuation() {
        let toks = kinds("a, b");
        assert_eq!(toks[0].0, TokenKind::Word);
        assert_eq!(toks[1].0, TokenKind::Punctuation);
        assert_eq!(toks[2].0, TokenKind::Delimiter);
        assert_eq!(toks[3].0, TokenKind::Word);

        assert_eq!(single("\n").kind, TokenKind::Delimiter);
        assert_eq!(single("%").kind, TokenKind::Punctuation);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("").count(), 0);
    }

    #[test]
    fn test_restartable() {
        let text = "two words";
        let first: Vec<Token> = tokenize(text).collect();
        let second: Vec<Token> = tokenize(text).collect();
        assert_eq!(first, second);
    }
}
