//! XLS formula encoding (infix text to RPN parse tokens)
//!
//! Excel stores a cell formula as a sequence of Ptg (Parse Thing) tokens
//! in Reverse Polish Notation. The workbook writer never looks inside a
//! formula; it hands the text to a [`FormulaEncoder`] while serializing and
//! stores the returned bytes as the `rgce` field of the FORMULA record.
//!
//! # Formula Structure
//!
//! - **Operand tokens**: references (`A1`, `$B$2`, `B1:I1`), constants (`42`, `"text"`, `TRUE`)
//! - **Operator tokens**: `+ - * / ^ & = <> < <= > >=`, unary `+`/`-`, `%`
//! - **Function tokens**: `SUM`, `IF`, `VLOOKUP`, ...
//!
//! ```text
//! Formula: =A1+B1*2
//! Tokens:  [tRefV(A1), tRefV(B1), tInt(2), tMul, tAdd]
//! ```
//!
//! References are emitted in value class (tRefV) and areas in reference
//! class (tAreaR), which is what functions taking ranges expect.

use super::biff::MAX_FORMULA_TOKENS;
use phf::phf_map;
use smallvec::SmallVec;

/// Turns formula text into BIFF8 `rgce` bytes.
///
/// Implementations must not depend on workbook state: the same text
/// always encodes to the same bytes.
pub trait FormulaEncoder: Send + Sync {
    /// Encode `formula` (with or without a leading `=`) or explain why it
    /// cannot be encoded.
    fn encode(&self, formula: &str) -> Result<Vec<u8>, String>;
}

/// Argument count accepted by a built-in function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Fixed(u8),
    /// Variable, between the bounds inclusive
    Variable(u8, u8),
}

/// Built-in function table: name to (iftab, arity).
static FUNCTIONS: phf::Map<&'static str, (u16, Arity)> = phf_map! {
    "COUNT" => (0, Arity::Variable(0, 30)),
    "IF" => (1, Arity::Variable(2, 3)),
    "ISNA" => (2, Arity::Fixed(1)),
    "ISERROR" => (3, Arity::Fixed(1)),
    "SUM" => (4, Arity::Variable(1, 30)),
    "AVERAGE" => (5, Arity::Variable(1, 30)),
    "MIN" => (6, Arity::Variable(1, 30)),
    "MAX" => (7, Arity::Variable(1, 30)),
    "ROW" => (8, Arity::Variable(0, 1)),
    "COLUMN" => (9, Arity::Variable(0, 1)),
    "NA" => (10, Arity::Fixed(0)),
    "STDEV" => (12, Arity::Variable(1, 30)),
    "PI" => (19, Arity::Fixed(0)),
    "SQRT" => (20, Arity::Fixed(1)),
    "ABS" => (24, Arity::Fixed(1)),
    "INT" => (25, Arity::Fixed(1)),
    "ROUND" => (27, Arity::Fixed(2)),
    "MID" => (31, Arity::Fixed(3)),
    "LEN" => (32, Arity::Fixed(1)),
    "AND" => (36, Arity::Variable(1, 30)),
    "OR" => (37, Arity::Variable(1, 30)),
    "NOT" => (38, Arity::Fixed(1)),
    "MOD" => (39, Arity::Fixed(2)),
    "TODAY" => (221, Arity::Fixed(0)),
    "NOW" => (74, Arity::Fixed(0)),
    "VLOOKUP" => (102, Arity::Variable(3, 4)),
    "HLOOKUP" => (101, Arity::Variable(3, 4)),
    "UPPER" => (113, Arity::Fixed(1)),
    "LOWER" => (112, Arity::Fixed(1)),
    "LEFT" => (115, Arity::Variable(1, 2)),
    "RIGHT" => (116, Arity::Variable(1, 2)),
    "TRIM" => (118, Arity::Fixed(1)),
    "COUNTA" => (169, Arity::Variable(0, 30)),
    "PRODUCT" => (183, Arity::Variable(0, 30)),
    "KURT" => (322, Arity::Variable(1, 30)),
    "CONCATENATE" => (336, Arity::Variable(0, 30)),
};

/// Binary operators with their token ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Power,
    Concat,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

impl BinaryOp {
    fn ptg(self) -> u8 {
        match self {
            BinaryOp::Add => 0x03,
            BinaryOp::Sub => 0x04,
            BinaryOp::Mul => 0x05,
            BinaryOp::Div => 0x06,
            BinaryOp::Power => 0x07,
            BinaryOp::Concat => 0x08,
            BinaryOp::Lt => 0x09,
            BinaryOp::Le => 0x0A,
            BinaryOp::Eq => 0x0B,
            BinaryOp::Ge => 0x0C,
            BinaryOp::Gt => 0x0D,
            BinaryOp::Ne => 0x0E,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Power => 5,
            BinaryOp::Mul | BinaryOp::Div => 4,
            BinaryOp::Add | BinaryOp::Sub => 3,
            BinaryOp::Concat => 2,
            _ => 1,
        }
    }
}

/// Cell reference with relative/absolute markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u16,
    pub col: u16,
    pub row_relative: bool,
    pub col_relative: bool,
}

impl CellRef {
    /// Column field with the relative flags in bits 14 and 15
    fn col_field(self) -> u16 {
        let mut field = self.col & 0x00FF;
        if self.col_relative {
            field |= 0x4000;
        }
        if self.row_relative {
            field |= 0x8000;
        }
        field
    }
}

/// Ptg (Parse Thing) tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Ptg {
    Int(u16),
    Num(f64),
    Str(String),
    Bool(bool),
    Ref(CellRef),
    Area(CellRef, CellRef),
    Binary(BinaryOp),
    UnaryPlus,
    UnaryMinus,
    Percent,
    Paren,
    MissArg,
    /// Fixed-arity function (iftab)
    Func(u16),
    /// Variable-arity function (iftab, argument count)
    FuncVar(u16, u8),
}

impl Ptg {
    /// Append the binary form of this token.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Ptg::Int(v) => {
                out.push(0x1E);
                out.extend_from_slice(&v.to_le_bytes());
            },
            Ptg::Num(v) => {
                out.push(0x1F);
                out.extend_from_slice(&v.to_le_bytes());
            },
            Ptg::Str(s) => {
                out.push(0x17);
                // Length was checked while lexing
                let units: Vec<u16> = s.encode_utf16().collect();
                out.push(units.len() as u8);
                if units.iter().all(|&u| u <= 0xFF) {
                    out.push(0x00);
                    out.extend(units.iter().map(|&u| u as u8));
                } else {
                    out.push(0x01);
                    for u in units {
                        out.extend_from_slice(&u.to_le_bytes());
                    }
                }
            },
            Ptg::Bool(b) => {
                out.push(0x1D);
                out.push(*b as u8);
            },
            Ptg::Ref(r) => {
                out.push(0x44);
                out.extend_from_slice(&r.row.to_le_bytes());
                out.extend_from_slice(&r.col_field().to_le_bytes());
            },
            Ptg::Area(first, last) => {
                out.push(0x25);
                out.extend_from_slice(&first.row.to_le_bytes());
                out.extend_from_slice(&last.row.to_le_bytes());
                out.extend_from_slice(&first.col_field().to_le_bytes());
                out.extend_from_slice(&last.col_field().to_le_bytes());
            },
            Ptg::Binary(op) => out.push(op.ptg()),
            Ptg::UnaryPlus => out.push(0x12),
            Ptg::UnaryMinus => out.push(0x13),
            Ptg::Percent => out.push(0x14),
            Ptg::Paren => out.push(0x15),
            Ptg::MissArg => out.push(0x16),
            Ptg::Func(index) => {
                out.push(0x41);
                out.extend_from_slice(&index.to_le_bytes());
            },
            Ptg::FuncVar(index, argc) => {
                out.push(0x42);
                out.push(*argc);
                out.extend_from_slice(&index.to_le_bytes());
            },
        }
    }
}

/// Encode a token list into `rgce` bytes.
pub fn encode_ptg_tokens(tokens: &[Ptg]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(tokens.len() * 4);
    for token in tokens {
        token.encode_into(&mut bytes);
    }
    bytes
}

/// Parse a cell reference like "A1" or "$B$2"
fn parse_cell_ref(s: &str) -> Option<CellRef> {
    let bytes = s.as_bytes();
    let mut pos = 0;

    let col_relative = bytes.first() != Some(&b'$');
    if !col_relative {
        pos += 1;
    }
    let col_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    let letters = &s[col_start..pos];
    if letters.is_empty() || letters.len() > 2 {
        return None;
    }

    let row_relative = bytes.get(pos) != Some(&b'$');
    if !row_relative {
        pos += 1;
    }
    let digits = &s[pos..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // A=1 .. Z=26, AA=27 ..
    let col = letters
        .bytes()
        .fold(0u32, |acc, c| acc * 26 + (c.to_ascii_uppercase() - b'A' + 1) as u32)
        - 1;
    let row: u32 = digits.parse().ok()?;
    if row == 0 || row > 65_536 || col > 255 {
        return None;
    }

    Some(CellRef {
        row: (row - 1) as u16,
        col: col as u16,
        row_relative,
        col_relative,
    })
}

/// Lexical tokens
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Operand(Ptg),
    Binary(BinaryOp),
    /// `+` or `-` before an operand
    Sign(char),
    Percent,
    Function(String),
    Open,
    Close,
    Comma,
}

fn lex(formula: &str) -> Result<Vec<Lexeme>, String> {
    let chars: Vec<char> = formula.chars().collect();
    let mut out: Vec<Lexeme> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Unary when nothing that yields a value precedes it
        let expects_operand = matches!(
            out.last(),
            None | Some(Lexeme::Binary(_) | Lexeme::Sign(_) | Lexeme::Open | Lexeme::Comma
                | Lexeme::Function(_))
        );

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && matches!(chars[i], 'e' | 'E') {
                let mut j = i + 1;
                if j < chars.len() && matches!(chars[j], '+' | '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value: f64 =
                fast_float2::parse(&text).map_err(|_| format!("invalid number '{text}'"))?;
            let ptg = if text.bytes().all(|b| b.is_ascii_digit()) && value <= u16::MAX as f64 {
                Ptg::Int(value as u16)
            } else {
                Ptg::Num(value)
            };
            out.push(Lexeme::Operand(ptg));
            continue;
        }

        if c == '"' {
            i += 1;
            let mut text = String::new();
            loop {
                match chars.get(i) {
                    None => return Err("unterminated string literal".to_string()),
                    Some('"') if chars.get(i + 1) == Some(&'"') => {
                        text.push('"');
                        i += 2;
                    },
                    Some('"') => {
                        i += 1;
                        break;
                    },
                    Some(&ch) => {
                        text.push(ch);
                        i += 1;
                    },
                }
            }
            if text.encode_utf16().count() > 255 {
                return Err("string literal longer than 255 characters".to_string());
            }
            out.push(Lexeme::Operand(Ptg::Str(text)));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '$' || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '$' | '_' | '.')) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();

            if chars.get(i) == Some(&'(') {
                let name = word.to_ascii_uppercase();
                out.push(Lexeme::Function(name));
                i += 1;
                continue;
            }
            if word.eq_ignore_ascii_case("TRUE") || word.eq_ignore_ascii_case("FALSE") {
                out.push(Lexeme::Operand(Ptg::Bool(word.eq_ignore_ascii_case("TRUE"))));
                continue;
            }
            if chars.get(i) == Some(&'!') {
                return Err(format!("sheet references are not supported: '{word}!'"));
            }

            let first = parse_cell_ref(&word).ok_or_else(|| format!("unknown name '{word}'"))?;
            if chars.get(i) == Some(&':') {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '$') {
                    end += 1;
                }
                let second: String = chars[start..end].iter().collect();
                let last = parse_cell_ref(&second)
                    .ok_or_else(|| format!("invalid range end '{second}'"))?;
                out.push(Lexeme::Operand(Ptg::Area(first, last)));
                i = end;
            } else {
                out.push(Lexeme::Operand(Ptg::Ref(first)));
            }
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (lexeme, width) = match (c, next) {
            ('<', Some('>')) => (Lexeme::Binary(BinaryOp::Ne), 2),
            ('<', Some('=')) => (Lexeme::Binary(BinaryOp::Le), 2),
            ('>', Some('=')) => (Lexeme::Binary(BinaryOp::Ge), 2),
            ('<', _) => (Lexeme::Binary(BinaryOp::Lt), 1),
            ('>', _) => (Lexeme::Binary(BinaryOp::Gt), 1),
            ('=', _) => (Lexeme::Binary(BinaryOp::Eq), 1),
            ('+' | '-', _) if expects_operand => (Lexeme::Sign(c), 1),
            ('+', _) => (Lexeme::Binary(BinaryOp::Add), 1),
            ('-', _) => (Lexeme::Binary(BinaryOp::Sub), 1),
            ('*', _) => (Lexeme::Binary(BinaryOp::Mul), 1),
            ('/', _) => (Lexeme::Binary(BinaryOp::Div), 1),
            ('^', _) => (Lexeme::Binary(BinaryOp::Power), 1),
            ('&', _) => (Lexeme::Binary(BinaryOp::Concat), 1),
            ('%', _) => (Lexeme::Percent, 1),
            ('(', _) => (Lexeme::Open, 1),
            (')', _) => (Lexeme::Close, 1),
            (',', _) => (Lexeme::Comma, 1),
            _ => return Err(format!("unexpected character '{c}'")),
        };
        out.push(lexeme);
        i += width;
    }

    Ok(out)
}

/// Operator stack entries
#[derive(Debug, Clone, Copy)]
enum Pending {
    Binary(BinaryOp),
    Sign(char),
    Paren,
    Call {
        name: &'static str,
        index: u16,
        arity: Arity,
        argc: u8,
    },
}

/// Unary signs bind tighter than every binary operator.
const SIGN_PRECEDENCE: u8 = 6;

fn pop_pending(output: &mut Vec<Ptg>, op: Pending) {
    match op {
        Pending::Binary(b) => output.push(Ptg::Binary(b)),
        Pending::Sign('-') => output.push(Ptg::UnaryMinus),
        Pending::Sign(_) => output.push(Ptg::UnaryPlus),
        Pending::Paren | Pending::Call { .. } => {},
    }
}

fn finish_call(name: &str, index: u16, arity: Arity, argc: u8) -> Result<Ptg, String> {
    match arity {
        Arity::Fixed(n) if n == argc => Ok(Ptg::Func(index)),
        Arity::Fixed(n) => Err(format!("{name} takes {n} arguments, got {argc}")),
        Arity::Variable(lo, hi) if (lo..=hi).contains(&argc) => Ok(Ptg::FuncVar(index, argc)),
        Arity::Variable(lo, hi) => Err(format!(
            "{name} takes {lo} to {hi} arguments, got {argc}"
        )),
    }
}

/// Default encoder: a shunting-yard parser over the built-in function table.
///
/// ```rust
/// use longan::ole::xls::{Biff8FormulaEncoder, FormulaEncoder};
///
/// let rgce = Biff8FormulaEncoder::new().encode("=1+2").unwrap();
/// assert_eq!(rgce, [0x1E, 1, 0, 0x1E, 2, 0, 0x03]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Biff8FormulaEncoder;

impl Biff8FormulaEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Convert formula text into RPN tokens.
    pub fn tokenize(&self, formula: &str) -> Result<Vec<Ptg>, String> {
        let body = formula.trim();
        let body = body.strip_prefix('=').unwrap_or(body);
        if body.trim().is_empty() {
            return Err("empty formula".to_string());
        }

        let lexemes = lex(body)?;
        let mut output: Vec<Ptg> = Vec::with_capacity(lexemes.len());
        let mut stack: SmallVec<[Pending; 16]> = SmallVec::new();
        // Whether the previous lexeme closed an operand (value on output)
        let mut have_value = false;

        for lexeme in lexemes {
            match lexeme {
                Lexeme::Operand(ptg) => {
                    if have_value {
                        return Err("missing operator between operands".to_string());
                    }
                    output.push(ptg);
                    have_value = true;
                },
                Lexeme::Sign(sign) => {
                    stack.push(Pending::Sign(sign));
                },
                Lexeme::Percent => {
                    if !have_value {
                        return Err("'%' without operand".to_string());
                    }
                    output.push(Ptg::Percent);
                },
                Lexeme::Binary(op) => {
                    if !have_value {
                        return Err("operator without left operand".to_string());
                    }
                    let prec = op.precedence();
                    while let Some(&top) = stack.last() {
                        let top_prec = match top {
                            Pending::Binary(b) => b.precedence(),
                            Pending::Sign(_) => SIGN_PRECEDENCE,
                            _ => break,
                        };
                        if top_prec < prec {
                            break;
                        }
                        stack.pop();
                        pop_pending(&mut output, top);
                    }
                    stack.push(Pending::Binary(op));
                    have_value = false;
                },
                Lexeme::Function(name) => {
                    if have_value {
                        return Err("missing operator before function".to_string());
                    }
                    let (&name, &(index, arity)) = FUNCTIONS
                        .get_entry(name.as_str())
                        .ok_or_else(|| format!("unknown function '{name}'"))?;
                    stack.push(Pending::Call {
                        name,
                        index,
                        arity,
                        argc: 0,
                    });
                },
                Lexeme::Open => {
                    if have_value {
                        return Err("missing operator before '('".to_string());
                    }
                    stack.push(Pending::Paren);
                },
                Lexeme::Comma => {
                    loop {
                        match stack.last_mut() {
                            Some(Pending::Call { argc, .. }) => {
                                if !have_value {
                                    output.push(Ptg::MissArg);
                                }
                                *argc = argc.saturating_add(1);
                                break;
                            },
                            Some(Pending::Paren) | None => {
                                return Err("',' outside of a function call".to_string());
                            },
                            Some(_) => {
                                if let Some(op) = stack.pop() {
                                    pop_pending(&mut output, op);
                                }
                            },
                        }
                    }
                    have_value = false;
                },
                Lexeme::Close => {
                    loop {
                        match stack.pop() {
                            Some(Pending::Paren) => {
                                if !have_value {
                                    return Err("empty parentheses".to_string());
                                }
                                output.push(Ptg::Paren);
                                break;
                            },
                            Some(Pending::Call {
                                name,
                                index,
                                arity,
                                mut argc,
                            }) => {
                                if have_value {
                                    argc = argc.saturating_add(1);
                                } else if argc > 0 {
                                    output.push(Ptg::MissArg);
                                    argc = argc.saturating_add(1);
                                }
                                output.push(finish_call(name, index, arity, argc)?);
                                break;
                            },
                            Some(op) => pop_pending(&mut output, op),
                            None => return Err("unbalanced ')'".to_string()),
                        }
                    }
                    have_value = true;
                },
            }
        }

        if !have_value {
            return Err("formula ends with an operator".to_string());
        }
        while let Some(op) = stack.pop() {
            match op {
                Pending::Paren | Pending::Call { .. } => {
                    return Err("unbalanced '('".to_string());
                },
                op => pop_pending(&mut output, op),
            }
        }

        Ok(output)
    }
}

impl FormulaEncoder for Biff8FormulaEncoder {
    fn encode(&self, formula: &str) -> Result<Vec<u8>, String> {
        let tokens = self.tokenize(formula)?;
        let rgce = encode_ptg_tokens(&tokens);
        if rgce.len() > MAX_FORMULA_TOKENS {
            return Err(format!(
                "formula needs {} token bytes, at most {MAX_FORMULA_TOKENS} fit a record",
                rgce.len()
            ));
        }
        Ok(rgce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn encode(formula: &str) -> Vec<u8> {
        Biff8FormulaEncoder::new().encode(formula).unwrap()
    }

    #[test]
    fn test_parse_cell_ref() {
        let a1 = parse_cell_ref("A1").unwrap();
        assert_eq!((a1.row, a1.col, a1.row_relative, a1.col_relative), (0, 0, true, true));

        let abs = parse_cell_ref("$B$2").unwrap();
        assert_eq!((abs.row, abs.col, abs.row_relative, abs.col_relative), (1, 1, false, false));

        let iv = parse_cell_ref("IV65536").unwrap();
        assert_eq!((iv.row, iv.col), (65535, 255));

        assert!(parse_cell_ref("IW1").is_none());
        assert!(parse_cell_ref("A0").is_none());
        assert!(parse_cell_ref("A65537").is_none());
    }

    #[test]
    fn test_sum_of_references() {
        assert_eq!(
            encode("=A3 + A6"),
            [0x44, 0x02, 0x00, 0x00, 0xC0, 0x44, 0x05, 0x00, 0x00, 0xC0, 0x03]
        );
    }

    #[test]
    fn test_if_with_strings() {
        let mut expected = vec![0x44, 0x04, 0x00, 0x00, 0xC0, 0x1E, 0x03, 0x00, 0x0D];
        expected.extend_from_slice(&[0x17, 0x03, 0x00, b'Y', b'e', b's']);
        expected.extend_from_slice(&[0x17, 0x02, 0x00, b'N', b'o']);
        expected.extend_from_slice(&[0x42, 0x03, 0x01, 0x00]);
        assert_eq!(encode("=IF(A5>3,\"Yes\", \"No\")"), expected);
    }

    #[rstest]
    #[case("=COUNT(B1:I1)", [0x00, 0x00, 0x00, 0x00], 0)]
    #[case("=STDEV(B2:I2)", [0x01, 0x00, 0x01, 0x00], 12)]
    #[case("=SUM(B2:I2)", [0x01, 0x00, 0x01, 0x00], 4)]
    #[case("=KURT(B2:I2)", [0x01, 0x00, 0x01, 0x00], 322)]
    fn test_range_functions(#[case] formula: &str, #[case] rows: [u8; 4], #[case] iftab: u16) {
        let mut expected = vec![0x25];
        expected.extend_from_slice(&rows);
        expected.extend_from_slice(&[0x01, 0xC0, 0x08, 0xC0]);
        expected.extend_from_slice(&[0x42, 0x01]);
        expected.extend_from_slice(&iftab.to_le_bytes());
        assert_eq!(encode(formula), expected);
    }

    #[test]
    fn test_precedence() {
        let tokens = Biff8FormulaEncoder::new().tokenize("1+2*3^2").unwrap();
        let ops: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t {
                Ptg::Binary(op) => Some(*op),
                _ => None,
            })
            .collect();
        assert_eq!(ops, [BinaryOp::Power, BinaryOp::Mul, BinaryOp::Add]);
    }

    #[test]
    fn test_unary_percent_and_paren() {
        let tokens = Biff8FormulaEncoder::new().tokenize("-(A1+2)%").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[3], Ptg::Paren);
        assert_eq!(tokens[4], Ptg::Percent);
        assert_eq!(tokens[5], Ptg::UnaryMinus);
    }

    #[test]
    fn test_fixed_arity_function() {
        let rgce = encode("=ROUND(3.14159, 2)");
        assert_eq!(rgce[0], 0x1F);
        assert_eq!(&rgce[rgce.len() - 3..], &[0x41, 27, 0]);
        assert!(Biff8FormulaEncoder::new().encode("=ROUND(1)").is_err());
    }

    #[test]
    fn test_nested_argument_counting() {
        let rgce = encode("=SUM(1, MAX(2, 3, 4), 5)");
        // MAX with 3 args, then SUM with 3 args
        assert_eq!(&rgce[12..16], &[0x42, 3, 7, 0]);
        assert_eq!(&rgce[rgce.len() - 4..], &[0x42, 3, 4, 0]);
    }

    #[test]
    fn test_booleans_and_escaped_quotes() {
        assert_eq!(encode("=TRUE"), [0x1D, 0x01]);
        assert_eq!(encode("=\"a\"\"b\""), [0x17, 3, 0, b'a', b'"', b'b']);
    }

    #[rstest]
    #[case("=")]
    #[case("=FOO(1)")]
    #[case("=A1+")]
    #[case("=(1")]
    #[case("=1)")]
    #[case("=\"open")]
    #[case("=Sheet1!A1")]
    #[case("=1 2")]
    fn test_rejected(#[case] formula: &str) {
        assert!(Biff8FormulaEncoder::new().encode(formula).is_err());
    }

    #[test]
    fn test_token_array_fits_formula_record() {
        // Each reference costs 5 bytes and each '+' one more
        let sum = |terms: usize| format!("={}", vec!["A1"; terms].join("+"));

        let rgce = encode(&sum(1300));
        assert_eq!(rgce.len(), 1300 * 5 + 1299);

        let err = Biff8FormulaEncoder::new().encode(&sum(1400)).unwrap_err();
        assert!(err.contains("8202"), "{err}");
    }
}
