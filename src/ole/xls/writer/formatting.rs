//! XLS cell formatting (FONT, FORMAT and XF records)
//!
//! A [`Format`] is a plain attribute bundle. The [`FormatTable`] interns
//! bundles into XF records, sharing FONT and FORMAT records between them.
//!
//! # XF layout
//!
//! | XF index | Purpose |
//! |---|---|
//! | 0..=14 | style XFs |
//! | 15 | default cell XF |
//! | 16..=20 | built-in comma / currency / percent style XFs |
//! | 21.. | user cell XFs, one per interned `Format` |

use super::super::{XlsError, XlsResult};
use super::biff::{push_short_unicode_string, write_format_record, write_record};
use super::shared_strings::TableState;
use phf::phf_map;
use std::collections::HashMap;
use std::io::Write;
use std::str::FromStr;

/// Font weight constants
pub const FONT_WEIGHT_NORMAL: u16 = 400;
pub const FONT_WEIGHT_BOLD: u16 = 700;

/// XF index of the default cell format
pub const DEFAULT_CELL_XF: u16 = 15;
/// XF index of the first user format
pub const FIRST_USER_XF: u16 = 21;

/// Number of FONT records written before user fonts
const DEFAULT_FONT_COUNT: u16 = 4;
/// First user-defined number format index in BIFF8
const FIRST_CUSTOM_NUMBER_FORMAT: u16 = 164;
/// Most user formats: Excel reads at most 4050 XF records, 21 are built in
pub const MAX_FORMATS: usize = 4050 - FIRST_USER_XF as usize;
/// Longest font name, in UTF-16 units
pub const MAX_FONT_NAME_LEN: usize = 31;

/// Palette colours as BIFF8 colour indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    Black,
    White,
    Red,
    Lime,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Brown,
    Green,
    Navy,
    Purple,
    Silver,
    Gray,
    Pink,
    Orange,
    /// Raw palette index: 8..=63, or the system colours 64 and 65
    Indexed(u8),
    /// System default colour
    #[default]
    Automatic,
}

static COLOR_NAMES: phf::Map<&'static str, Color> = phf_map! {
    "black" => Color::Black,
    "white" => Color::White,
    "red" => Color::Red,
    "lime" => Color::Lime,
    "blue" => Color::Blue,
    "yellow" => Color::Yellow,
    "magenta" => Color::Magenta,
    "fuchsia" => Color::Magenta,
    "cyan" => Color::Cyan,
    "aqua" => Color::Cyan,
    "brown" => Color::Brown,
    "green" => Color::Green,
    "navy" => Color::Navy,
    "purple" => Color::Purple,
    "silver" => Color::Silver,
    "gray" => Color::Gray,
    "grey" => Color::Gray,
    "pink" => Color::Pink,
    "orange" => Color::Orange,
};

impl Color {
    /// BIFF8 colour index
    pub fn index(self) -> u16 {
        match self {
            Color::Black => 0x08,
            Color::White => 0x09,
            Color::Red => 0x0A,
            Color::Lime => 0x0B,
            Color::Blue => 0x0C,
            Color::Yellow => 0x0D,
            Color::Magenta => 0x0E,
            Color::Cyan => 0x0F,
            Color::Brown => 0x10,
            Color::Green => 0x11,
            Color::Navy => 0x12,
            Color::Purple => 0x14,
            Color::Silver => 0x16,
            Color::Gray => 0x17,
            Color::Pink => 0x21,
            Color::Orange => 0x35,
            Color::Indexed(idx) => idx as u16,
            Color::Automatic => 0x7FFF,
        }
    }

    /// Look up a colour by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Color> {
        COLOR_NAMES.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Reject raw indices that do not name a palette entry.
    pub fn validate(self) -> XlsResult<()> {
        match self {
            Color::Indexed(idx) if !(8..=65).contains(&idx) => {
                Err(XlsError::InvalidColorIndex(idx))
            },
            _ => Ok(()),
        }
    }

    /// 7-bit palette index for XF fields, with `fallback` for automatic.
    ///
    /// Validated colours never exceed 65, so the mask loses nothing.
    fn xf_index(self, fallback: u8) -> u8 {
        match self {
            Color::Automatic => fallback,
            other => (other.index() & 0x7F) as u8,
        }
    }
}

impl FromStr for Color {
    type Err = XlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_name(s).ok_or_else(|| XlsError::UnknownColor(s.to_string()))
    }
}

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    #[default]
    General = 0,
    Left = 1,
    Center = 2,
    Right = 3,
    Fill = 4,
    Justify = 5,
    CenterAcrossSelection = 6,
}

/// Vertical alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    Top = 0,
    Center = 1,
    #[default]
    Bottom = 2,
    Justify = 3,
}

/// Border style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    None = 0,
    Thin = 1,
    Medium = 2,
    Dashed = 3,
    Dotted = 4,
    Thick = 5,
    Double = 6,
    Hair = 7,
}

/// Fill pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillPattern {
    #[default]
    None = 0,
    Solid = 1,
    MediumGray = 2,
    DarkGray = 3,
    LightGray = 4,
    DarkHorizontal = 5,
    DarkVertical = 6,
    DarkDown = 7,
    DarkUp = 8,
    DarkGrid = 9,
    DarkTrellis = 10,
}

/// Font underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Underline {
    #[default]
    None = 0x00,
    Single = 0x01,
    Double = 0x02,
    SingleAccounting = 0x21,
    DoubleAccounting = 0x22,
}

/// Font vertical position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Script {
    #[default]
    Normal = 0,
    Superscript = 1,
    Subscript = 2,
}

/// Font definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    /// Font name
    pub name: String,
    /// Font height in twips (1/20 of a point)
    pub height: u16,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikeout: bool,
    pub script: Script,
    pub color: Color,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "Arial".to_string(),
            height: 200,
            bold: false,
            italic: false,
            underline: Underline::None,
            strikeout: false,
            script: Script::Normal,
            color: Color::Automatic,
        }
    }
}

/// Border style and colour of one cell edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub style: BorderStyle,
    pub color: Color,
}

/// Cell borders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Borders {
    pub left: Border,
    pub right: Border,
    pub top: Border,
    pub bottom: Border,
}

/// Cell fill (background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fill {
    pub pattern: FillPattern,
    pub fg_color: Color,
    pub bg_color: Color,
}

/// Cell format: a value-type bundle of font, number format, alignment,
/// borders and fill.
///
/// Setters consume and return the format so they chain:
///
/// ```rust
/// use longan::ole::xls::{Color, Format};
///
/// let heading = Format::new().set_bold().set_color(Color::Blue).set_size(14.0);
/// assert!(heading.font().bold);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format {
    font: Font,
    num_format: String,
    h_align: HorizontalAlignment,
    v_align: VerticalAlignment,
    text_wrap: bool,
    borders: Borders,
    fill: Fill,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            font: Font::default(),
            num_format: "General".to_string(),
            h_align: HorizontalAlignment::General,
            v_align: VerticalAlignment::Bottom,
            text_wrap: false,
            borders: Borders::default(),
            fill: Fill::default(),
        }
    }
}

impl Format {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the attributes that have BIFF8 limits: the font name length
    /// and raw palette indices.
    pub fn validate(&self) -> XlsResult<()> {
        let name_len = self.font.name.encode_utf16().count();
        if name_len == 0 || name_len > MAX_FONT_NAME_LEN {
            return Err(XlsError::InvalidFontName(self.font.name.clone()));
        }
        let b = &self.borders;
        [
            self.font.color,
            b.left.color,
            b.right.color,
            b.top.color,
            b.bottom.color,
            self.fill.fg_color,
            self.fill.bg_color,
        ]
        .into_iter()
        .try_for_each(Color::validate)
    }

    /// Format applied to hyperlink cells without an explicit format.
    pub fn hyperlink() -> Self {
        Self::new()
            .set_color(Color::Blue)
            .set_underline(Underline::Single)
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn num_format(&self) -> &str {
        &self.num_format
    }

    pub fn set_bold(mut self) -> Self {
        self.font.bold = true;
        self
    }

    pub fn set_italic(mut self) -> Self {
        self.font.italic = true;
        self
    }

    pub fn set_underline(mut self, underline: Underline) -> Self {
        self.font.underline = underline;
        self
    }

    pub fn set_strikeout(mut self) -> Self {
        self.font.strikeout = true;
        self
    }

    pub fn set_font_script(mut self, script: Script) -> Self {
        self.font.script = script;
        self
    }

    pub fn set_font(mut self, name: &str) -> Self {
        self.font.name = name.to_string();
        self
    }

    /// Font size in points.
    pub fn set_size(mut self, points: f64) -> Self {
        self.font.height = (points * 20.0).round().clamp(20.0, 8180.0) as u16;
        self
    }

    /// Font colour
    pub fn set_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Number format pattern, e.g. `"0.00"` or `"d-mmm-yy"`.
    pub fn set_num_format(mut self, pattern: &str) -> Self {
        self.num_format = pattern.to_string();
        self
    }

    pub fn set_align(mut self, align: HorizontalAlignment) -> Self {
        self.h_align = align;
        self
    }

    pub fn set_valign(mut self, align: VerticalAlignment) -> Self {
        self.v_align = align;
        self
    }

    pub fn set_text_wrap(mut self) -> Self {
        self.text_wrap = true;
        self
    }

    /// Same border style on all four edges.
    pub fn set_border(mut self, style: BorderStyle) -> Self {
        for edge in self.edges_mut() {
            edge.style = style;
        }
        self
    }

    /// Same border colour on all four edges.
    pub fn set_border_color(mut self, color: Color) -> Self {
        for edge in self.edges_mut() {
            edge.color = color;
        }
        self
    }

    pub fn set_left(mut self, style: BorderStyle) -> Self {
        self.borders.left.style = style;
        self
    }

    pub fn set_right(mut self, style: BorderStyle) -> Self {
        self.borders.right.style = style;
        self
    }

    pub fn set_top(mut self, style: BorderStyle) -> Self {
        self.borders.top.style = style;
        self
    }

    pub fn set_bottom(mut self, style: BorderStyle) -> Self {
        self.borders.bottom.style = style;
        self
    }

    pub fn set_pattern(mut self, pattern: FillPattern) -> Self {
        self.fill.pattern = pattern;
        self
    }

    pub fn set_fg_color(mut self, color: Color) -> Self {
        self.fill.fg_color = color;
        self
    }

    /// Cell background. Without an explicit pattern this becomes a solid fill.
    pub fn set_bg_color(mut self, color: Color) -> Self {
        self.fill.bg_color = color;
        self
    }

    fn edges_mut(&mut self) -> [&mut Border; 4] {
        let Borders {
            left,
            right,
            top,
            bottom,
        } = &mut self.borders;
        [left, right, top, bottom]
    }
}

/// Identifier of an interned [`Format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatId(u16);

impl FormatId {
    /// XF index referenced by cell records.
    #[inline]
    pub fn xf_index(self) -> u16 {
        FIRST_USER_XF + self.0
    }
}

/// Built-in number formats recognised without a FORMAT record.
const BUILTIN_NUMBER_FORMATS: &[(u16, &str)] = &[
    (0x00, "General"),
    (0x01, "0"),
    (0x02, "0.00"),
    (0x03, "#,##0"),
    (0x04, "#,##0.00"),
    (0x05, "\"$\"#,##0_);(\"$\"#,##0)"),
    (0x06, "\"$\"#,##0_);[Red](\"$\"#,##0)"),
    (0x07, "\"$\"#,##0.00_);(\"$\"#,##0.00)"),
    (0x08, "\"$\"#,##0.00_);[Red](\"$\"#,##0.00)"),
    (0x09, "0%"),
    (0x0A, "0.00%"),
    (0x0B, "0.00E+00"),
    (0x0C, "# ?/?"),
    (0x0D, "# ??/??"),
    (0x0E, "m/d/yy"),
    (0x0F, "d-mmm-yy"),
    (0x10, "d-mmm"),
    (0x11, "mmm-yy"),
    (0x12, "h:mm AM/PM"),
    (0x13, "h:mm:ss AM/PM"),
    (0x14, "h:mm"),
    (0x15, "h:mm:ss"),
    (0x16, "m/d/yy h:mm"),
    (0x25, "#,##0_);(#,##0)"),
    (0x26, "#,##0_);[Red](#,##0)"),
    (0x27, "#,##0.00_);(#,##0.00)"),
    (0x28, "#,##0.00_);[Red](#,##0.00)"),
    (0x29, "_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)"),
    (0x2A, "_(\"$\"* #,##0_);_(\"$\"* (#,##0);_(\"$\"* \"-\"_);_(@_)"),
    (0x2B, "_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)"),
    (0x2C, "_(\"$\"* #,##0.00_);_(\"$\"* (#,##0.00);_(\"$\"* \"-\"??_);_(@_)"),
    (0x2D, "mm:ss"),
    (0x2E, "[h]:mm:ss"),
    (0x2F, "mm:ss.0"),
    (0x30, "##0.0E+0"),
    (0x31, "@"),
];

fn builtin_number_format_index(pattern: &str) -> Option<u16> {
    BUILTIN_NUMBER_FORMATS
        .iter()
        .find(|(_, p)| *p == pattern)
        .map(|(idx, _)| *idx)
}

/// An interned format resolved to record indices.
#[derive(Debug, Clone)]
struct ResolvedXf {
    font_index: u16,
    format_index: u16,
    format: Format,
}

/// `base + offset` as a record index, or `FormatLimitExceeded`.
fn index_u16(base: u16, offset: usize) -> XlsResult<u16> {
    u16::try_from(offset)
        .ok()
        .and_then(|offset| base.checked_add(offset))
        .ok_or(XlsError::FormatLimitExceeded(MAX_FORMATS))
}

/// Interning table for cell formats.
///
/// Identical bundles share one `FormatId`. Fonts and number format
/// strings are interned as sub-tables. The table is append-only and is
/// frozen when serialization starts.
#[derive(Debug, Default)]
pub struct FormatTable {
    xfs: Vec<ResolvedXf>,
    xf_lookup: HashMap<Format, FormatId>,
    fonts: Vec<Font>,
    font_lookup: HashMap<Font, u16>,
    number_formats: Vec<(u16, String)>,
    number_format_lookup: HashMap<String, u16>,
    state: TableState,
}

impl FormatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a format and return its identifier.
    pub fn add(&mut self, format: &Format) -> XlsResult<FormatId> {
        if let Some(&id) = self.xf_lookup.get(format) {
            return Ok(id);
        }
        if self.state == TableState::Frozen {
            return Err(XlsError::TableFrozen("format table"));
        }

        if self.xfs.len() >= MAX_FORMATS {
            return Err(XlsError::FormatLimitExceeded(MAX_FORMATS));
        }
        format.validate()?;

        let font_index = self.intern_font(&format.font)?;
        let format_index = self.intern_number_format(&format.num_format)?;
        // Below MAX_FORMATS, so `FormatId::xf_index` cannot overflow.
        let id = FormatId(index_u16(0, self.xfs.len())?);
        self.xfs.push(ResolvedXf {
            font_index,
            format_index,
            format: format.clone(),
        });
        self.xf_lookup.insert(format.clone(), id);
        Ok(id)
    }

    /// XF index for a cell: the default cell XF or the user XF.
    #[inline]
    pub fn xf_index(&self, id: Option<FormatId>) -> u16 {
        id.map_or(DEFAULT_CELL_XF, FormatId::xf_index)
    }

    pub fn freeze(&mut self) {
        self.state = TableState::Frozen;
    }

    #[inline]
    pub fn state(&self) -> TableState {
        self.state
    }

    /// Number of user formats
    pub fn len(&self) -> usize {
        self.xfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xfs.is_empty()
    }

    fn intern_font(&mut self, font: &Font) -> XlsResult<u16> {
        if *font == Font::default() {
            return Ok(0);
        }
        if let Some(&idx) = self.font_lookup.get(font) {
            return Ok(idx);
        }
        // Index 4 does not exist in BIFF8, so user fonts start at 5.
        let idx = index_u16(DEFAULT_FONT_COUNT + 1, self.fonts.len())?;
        self.fonts.push(font.clone());
        self.font_lookup.insert(font.clone(), idx);
        Ok(idx)
    }

    fn intern_number_format(&mut self, pattern: &str) -> XlsResult<u16> {
        let normalized = if pattern.eq_ignore_ascii_case("TEXT") {
            "@"
        } else {
            pattern
        };
        if let Some(idx) = builtin_number_format_index(normalized) {
            return Ok(idx);
        }
        if let Some(&idx) = self.number_format_lookup.get(normalized) {
            return Ok(idx);
        }
        let idx = index_u16(FIRST_CUSTOM_NUMBER_FORMAT, self.number_formats.len())?;
        self.number_formats.push((idx, normalized.to_string()));
        self.number_format_lookup
            .insert(normalized.to_string(), idx);
        Ok(idx)
    }

    /// Write all FONT records: four defaults, then user fonts.
    pub fn write_fonts<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        let base = Font::default();
        let defaults = [
            base.clone(),
            Font {
                bold: true,
                ..base.clone()
            },
            Font {
                italic: true,
                ..base.clone()
            },
            Font {
                bold: true,
                italic: true,
                ..base
            },
        ];
        for font in defaults.iter().chain(&self.fonts) {
            write_font(writer, font)?;
        }
        Ok(())
    }

    /// Write FORMAT records for built-in indices 0..=7 and all custom formats.
    pub fn write_number_formats<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        for &(index, pattern) in BUILTIN_NUMBER_FORMATS.iter().take(8) {
            write_format_record(writer, index, pattern)?;
        }
        for (index, pattern) in &self.number_formats {
            write_format_record(writer, *index, pattern)?;
        }
        Ok(())
    }

    /// Write all XF records in table order.
    pub fn write_xfs<W: Write>(&self, writer: &mut W) -> XlsResult<()> {
        let base = Format::default();

        // 0..=14: style XFs. 1-4 reference the bold and italic fonts.
        for i in 0u16..15 {
            let font_index = match i {
                1 | 2 => 1,
                3 | 4 => 2,
                _ => 0,
            };
            let used = if i == 0 { 0x00 } else { 0xF4 };
            write_xf(writer, &base, font_index, 0, XfKind::Style(used))?;
        }

        // 15: default cell XF
        write_xf(writer, &base, 0, 0, XfKind::Cell)?;

        // 16..=20: comma, comma [0], currency, currency [0], percent
        for fmt_idx in [0x2B, 0x29, 0x2C, 0x2A, 0x09] {
            write_xf(writer, &base, 1, fmt_idx, XfKind::Style(0xF8))?;
        }

        for xf in &self.xfs {
            write_xf(
                writer,
                &xf.format,
                xf.font_index,
                xf.format_index,
                XfKind::Cell,
            )?;
        }
        Ok(())
    }
}

/// Write FONT record (0x0031)
pub fn write_font<W: Write>(writer: &mut W, font: &Font) -> XlsResult<()> {
    let mut data = Vec::with_capacity(16 + font.name.len() * 2);
    data.extend_from_slice(&font.height.to_le_bytes());

    let mut grbit = 0u16;
    if font.italic {
        grbit |= 0x0002;
    }
    if font.strikeout {
        grbit |= 0x0008;
    }
    data.extend_from_slice(&grbit.to_le_bytes());
    data.extend_from_slice(&font.color.index().to_le_bytes());

    let weight = if font.bold {
        FONT_WEIGHT_BOLD
    } else {
        FONT_WEIGHT_NORMAL
    };
    data.extend_from_slice(&weight.to_le_bytes());
    data.extend_from_slice(&(font.script as u16).to_le_bytes());
    data.push(font.underline as u8);
    // Family, character set, reserved
    data.extend_from_slice(&[0, 0, 0]);
    push_short_unicode_string(&mut data, &font.name)?;

    write_record(writer, 0x0031, &data)
}

/// Whether an XF is a style XF (with its used-attribute byte) or a cell XF.
#[derive(Debug, Clone, Copy)]
enum XfKind {
    Style(u8),
    Cell,
}

/// Write XF (Extended Format) record (0x00E0)
fn write_xf<W: Write>(
    writer: &mut W,
    format: &Format,
    font_index: u16,
    format_index: u16,
    kind: XfKind,
) -> XlsResult<()> {
    let mut fill = format.fill;
    // A background colour without a pattern means a solid fill of that colour.
    if fill.pattern == FillPattern::None && fill.bg_color != Color::Automatic {
        if fill.fg_color == Color::Automatic {
            fill.fg_color = fill.bg_color;
            fill.bg_color = Color::Automatic;
        }
        fill.pattern = FillPattern::Solid;
    }
    let fg = fill.fg_color.xf_index(0x40);
    let bg = fill.bg_color.xf_index(0x41);

    let b = &format.borders;
    let has_border = [b.left, b.right, b.top, b.bottom]
        .iter()
        .any(|e| e.style != BorderStyle::None);

    let (type_prot, used) = match kind {
        XfKind::Style(used) => (0xFFF5u16, used),
        XfKind::Cell => {
            let mut used = 0u8;
            if format_index != 0 {
                used |= 0x04;
            }
            if font_index != 0 {
                used |= 0x08;
            }
            if format.h_align != HorizontalAlignment::General
                || format.v_align != VerticalAlignment::Bottom
                || format.text_wrap
            {
                used |= 0x10;
            }
            if has_border {
                used |= 0x20;
            }
            if fill.pattern != FillPattern::None || fg != 0x40 || bg != 0x41 {
                used |= 0x40;
            }
            (0x0001u16, used)
        },
    };

    let mut data = Vec::with_capacity(20);
    data.extend_from_slice(&font_index.to_le_bytes());
    data.extend_from_slice(&format_index.to_le_bytes());
    data.extend_from_slice(&type_prot.to_le_bytes());

    let mut align = (format.h_align as u8) | ((format.v_align as u8) << 4);
    if format.text_wrap {
        align |= 0x08;
    }
    // Alignment, rotation, indent
    data.extend_from_slice(&[align, 0, 0]);
    data.push(used);

    let border_styles = (b.left.style as u16)
        | ((b.right.style as u16) << 4)
        | ((b.top.style as u16) << 8)
        | ((b.bottom.style as u16) << 12);
    data.extend_from_slice(&border_styles.to_le_bytes());

    let edge_color = |e: &Border| {
        if e.style == BorderStyle::None {
            0
        } else {
            e.color.xf_index(0x40) as u32
        }
    };
    let lr = edge_color(&b.left) | (edge_color(&b.right) << 7);
    data.extend_from_slice(&(lr as u16).to_le_bytes());

    let tb = edge_color(&b.top) | (edge_color(&b.bottom) << 7) | ((fill.pattern as u32) << 26);
    data.extend_from_slice(&tb.to_le_bytes());

    let fill_colors = (fg as u16) | ((bg as u16) << 7);
    data.extend_from_slice(&fill_colors.to_le_bytes());

    write_record(writer, 0x00E0, &data)
}
