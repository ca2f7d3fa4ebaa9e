//! FILENAME: core/persistence/src/sheet_xml.rs
//! PURPOSE: Reads the parts of an XLSX package that calamine does not expose:
//! cell styles (styles.xml cellXfs), per-cell style indices, merged regions,
//! column widths and row heights of the first worksheet.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use engine::coord::{parse_a1, CellRange};
use engine::style::{
    Alignment, BorderLineStyle, BorderStyle, Borders, CellStyle, Color, FontStyle, TextAlign,
    VerticalAlign, GENERAL_FORMAT,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::PersistenceError;

/// Widest `<col>` span that is expanded into per-column widths.
const MAX_COLUMN_SPAN: u32 = 1024;

/// Layout information of one worksheet.
#[derive(Debug, Default)]
pub(crate) struct SheetLayout {
    /// Styles indexed by their cellXfs position.
    pub styles: Vec<CellStyle>,
    /// (row, col) -> cellXfs index, only for non-default styles.
    pub cell_styles: Vec<((u32, u32), usize)>,
    pub merged_regions: Vec<CellRange>,
    pub column_widths: HashMap<u32, f64>,
    pub row_heights: HashMap<u32, f64>,
    pub hyperlinks: Vec<SheetHyperlink>,
}

/// A `<hyperlink>` entry with its relationship target already resolved.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SheetHyperlink {
    pub coord: (u32, u32),
    pub target: String,
    pub tooltip: Option<String>,
}

/// A `<hyperlink>` entry as it appears in the worksheet part.
#[derive(Debug, Default)]
struct HyperlinkRef {
    coord: (u32, u32),
    rel_id: Option<String>,
    location: Option<String>,
    tooltip: Option<String>,
}

/// Reads styles and layout of the first worksheet in the package.
pub(crate) fn read_sheet_layout(path: &Path) -> Result<SheetLayout, PersistenceError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let styles = match read_entry(&mut archive, "xl/styles.xml")? {
        Some(xml) => parse_styles(&xml)?,
        None => vec![CellStyle::new()],
    };

    let sheet_path = first_sheet_path(&mut archive)?;
    let xml = read_entry(&mut archive, &sheet_path)?
        .ok_or_else(|| PersistenceError::SheetNotFound(sheet_path.clone()))?;

    let (mut layout, links) = parse_sheet(&xml)?;
    if !links.is_empty() {
        let targets = match read_entry(&mut archive, &sheet_rels_path(&sheet_path))? {
            Some(rels) => parse_relationships(&rels)?,
            None => HashMap::new(),
        };
        layout.hyperlinks = resolve_hyperlinks(links, &targets);
    }
    layout.styles = styles;
    Ok(layout)
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn sheet_rels_path(sheet_path: &str) -> String {
    match sheet_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", sheet_path),
    }
}

/// Relationship id -> target of a `.rels` part.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, PersistenceError> {
    let mut targets = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

fn resolve_hyperlinks(
    links: Vec<HyperlinkRef>,
    targets: &HashMap<String, String>,
) -> Vec<SheetHyperlink> {
    links
        .into_iter()
        .filter_map(|link| {
            let external = link.rel_id.as_ref().and_then(|id| targets.get(id));
            let target = match (external, link.location) {
                (Some(target), Some(location)) => format!("{}#{}", target, location),
                (Some(target), None) => target.clone(),
                (None, Some(location)) => format!("internal:{}", location),
                (None, None) => return None,
            };
            Some(SheetHyperlink {
                coord: link.coord,
                target,
                tooltip: link.tooltip,
            })
        })
        .collect()
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, PersistenceError> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolves the package path of the first sheet listed in workbook.xml.
fn first_sheet_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String, PersistenceError> {
    const FALLBACK: &str = "xl/worksheets/sheet1.xml";

    let Some(workbook_xml) = read_entry(archive, "xl/workbook.xml")? else {
        return Ok(FALLBACK.to_string());
    };

    let mut rel_id = None;
    let mut reader = Reader::from_str(&workbook_xml);
    reader.trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                rel_id = attr(&e, b"r:id");
                break;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let Some(rel_id) = rel_id else {
        return Ok(FALLBACK.to_string());
    };
    let Some(rels_xml) = read_entry(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(FALLBACK.to_string());
    };

    let mut reader = Reader::from_str(&rels_xml);
    reader.trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e)
                if e.local_name().as_ref() == b"Relationship"
                    && attr(&e, b"Id").as_deref() == Some(rel_id.as_str()) =>
            {
                let target = attr(&e, b"Target").unwrap_or_default();
                return Ok(match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{}", target),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(FALLBACK.to_string())
}

/// Reads an attribute value by its full (possibly prefixed) name.
fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            let unescaped = quick_xml::escape::unescape(&raw)
                .map(|v| v.into_owned())
                .ok();
            unescaped.unwrap_or(raw)
        })
}

/// OOXML boolean attribute; an element like `<b/>` without `val` means true.
fn flag(e: &BytesStart<'_>) -> bool {
    !matches!(attr(e, b"val").as_deref(), Some("0") | Some("false") | Some("none"))
}

fn rgb_color(e: &BytesStart<'_>) -> Option<Color> {
    attr(e, b"rgb").and_then(|rgb| Color::from_hex(&rgb))
}

fn builtin_number_format(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => GENERAL_FORMAT,
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        49 => "@",
        _ => return None,
    })
}

fn border_line(style: Option<&str>) -> BorderLineStyle {
    match style {
        Some("thin") | Some("hair") => BorderLineStyle::Thin,
        Some("medium") => BorderLineStyle::Medium,
        Some("thick") => BorderLineStyle::Thick,
        Some("dashed") | Some("mediumDashed") | Some("dashDot") | Some("mediumDashDot") => {
            BorderLineStyle::Dashed
        }
        Some("dotted") => BorderLineStyle::Dotted,
        Some("double") => BorderLineStyle::Double,
        _ => BorderLineStyle::None,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Other,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

#[derive(Clone, Copy)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

fn side_mut(borders: &mut Borders, side: Side) -> &mut BorderStyle {
    match side {
        Side::Top => &mut borders.top,
        Side::Right => &mut borders.right,
        Side::Bottom => &mut borders.bottom,
        Side::Left => &mut borders.left,
    }
}

/// Parses styles.xml into one CellStyle per cellXfs entry.
fn parse_styles(xml: &str) -> Result<Vec<CellStyle>, PersistenceError> {
    let mut num_formats: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    // (is solid, foreground color)
    let mut fills: Vec<(bool, Option<Color>)> = Vec::new();
    let mut borders: Vec<Borders> = Vec::new();
    let mut xfs: Vec<CellStyle> = Vec::new();

    let mut section = Section::Other;
    let mut side: Option<Side> = None;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        let event = reader.read_event()?;
        let e = match &event {
            Event::Start(e) | Event::Empty(e) => e,
            Event::End(end) => {
                match end.local_name().as_ref() {
                    b"numFmts" | b"fonts" | b"fills" | b"borders" | b"cellXfs" => {
                        section = Section::Other
                    }
                    b"top" | b"right" | b"bottom" | b"left" => side = None,
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };
        let is_empty = matches!(event, Event::Empty(_));

        match (section, e.local_name().as_ref()) {
            (_, b"numFmts") => section = Section::NumFmts,
            (_, b"fonts") => section = Section::Fonts,
            (_, b"fills") => section = Section::Fills,
            (_, b"borders") => section = Section::Borders,
            (_, b"cellXfs") => section = Section::CellXfs,
            (_, b"cellStyleXfs") | (_, b"dxfs") | (_, b"cellStyles") => section = Section::Other,

            (Section::NumFmts, b"numFmt") => {
                if let (Some(id), Some(code)) = (attr(e, b"numFmtId"), attr(e, b"formatCode")) {
                    if let Ok(id) = id.parse() {
                        num_formats.insert(id, code);
                    }
                }
            }

            (Section::Fonts, b"font") => fonts.push(FontStyle::default()),
            (Section::Fonts, name) => {
                if let Some(font) = fonts.last_mut() {
                    match name {
                        b"b" => font.bold = flag(e),
                        b"i" => font.italic = flag(e),
                        b"u" => font.underline = flag(e),
                        b"strike" => font.strikethrough = flag(e),
                        b"sz" => {
                            if let Some(size) = attr(e, b"val").and_then(|v| v.parse::<f64>().ok()) {
                                font.size = size.round().clamp(1.0, 255.0) as u8;
                            }
                        }
                        b"name" => {
                            if let Some(family) = attr(e, b"val") {
                                font.name = family;
                            }
                        }
                        b"color" => {
                            if let Some(color) = rgb_color(e) {
                                font.color = color;
                            }
                        }
                        _ => {}
                    }
                }
            }

            (Section::Fills, b"fill") => fills.push((false, None)),
            (Section::Fills, b"patternFill") => {
                if let Some(fill) = fills.last_mut() {
                    fill.0 = attr(e, b"patternType").as_deref() == Some("solid");
                }
            }
            (Section::Fills, b"fgColor") => {
                if let Some(fill) = fills.last_mut() {
                    fill.1 = rgb_color(e);
                }
            }

            (Section::Borders, b"border") => borders.push(Borders::default()),
            (Section::Borders, name @ (b"top" | b"right" | b"bottom" | b"left")) => {
                let current = match name {
                    b"top" => Side::Top,
                    b"right" => Side::Right,
                    b"bottom" => Side::Bottom,
                    _ => Side::Left,
                };
                if let Some(border) = borders.last_mut() {
                    side_mut(border, current).style = border_line(attr(e, b"style").as_deref());
                }
                side = if is_empty { None } else { Some(current) };
            }
            (Section::Borders, b"color") => {
                if let (Some(border), Some(current), Some(color)) =
                    (borders.last_mut(), side, rgb_color(e))
                {
                    side_mut(border, current).color = color;
                }
            }

            (Section::CellXfs, b"xf") => {
                let index = |key: &[u8]| -> usize {
                    attr(e, key).and_then(|v| v.parse().ok()).unwrap_or(0)
                };
                let mut style = CellStyle::new();
                if let Some(font) = fonts.get(index(b"fontId")) {
                    style.font = font.clone();
                }
                // Theme and indexed fill colors are not resolved
                if let Some((true, Some(color))) = fills.get(index(b"fillId")) {
                    style.fill = Some(*color);
                }
                if let Some(border) = borders.get(index(b"borderId")) {
                    style.borders = border.clone();
                }
                let fmt_id = index(b"numFmtId") as u32;
                style.number_format = num_formats
                    .get(&fmt_id)
                    .cloned()
                    .or_else(|| builtin_number_format(fmt_id).map(str::to_string))
                    .unwrap_or_else(|| GENERAL_FORMAT.to_string());
                xfs.push(style);
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(style) = xfs.last_mut() {
                    style.alignment = parse_alignment(e);
                }
            }

            _ => {}
        }
    }

    if xfs.is_empty() {
        xfs.push(CellStyle::new());
    }
    Ok(xfs)
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    Alignment {
        horizontal: match attr(e, b"horizontal").as_deref() {
            Some("left") => TextAlign::Left,
            Some("center") | Some("centerContinuous") => TextAlign::Center,
            Some("right") => TextAlign::Right,
            _ => TextAlign::General,
        },
        vertical: match attr(e, b"vertical").as_deref() {
            Some("top") => VerticalAlign::Top,
            Some("center") => VerticalAlign::Middle,
            _ => VerticalAlign::Bottom,
        },
        wrap_text: matches!(attr(e, b"wrapText").as_deref(), Some("1") | Some("true")),
        indent: attr(e, b"indent").and_then(|v| v.parse().ok()).unwrap_or(0),
    }
}

/// Parses a worksheet part for cell style indices, merges, dimensions and
/// hyperlink references.
fn parse_sheet(xml: &str) -> Result<(SheetLayout, Vec<HyperlinkRef>), PersistenceError> {
    let mut layout = SheetLayout::default();
    let mut links = Vec::new();

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        let event = reader.read_event()?;
        let e = match &event {
            Event::Start(e) | Event::Empty(e) => e,
            Event::Eof => break,
            _ => continue,
        };

        match e.local_name().as_ref() {
            b"col" => {
                let min: Option<u32> = attr(e, b"min").and_then(|v| v.parse().ok());
                let max: Option<u32> = attr(e, b"max").and_then(|v| v.parse().ok());
                let width: Option<f64> = attr(e, b"width").and_then(|v| v.parse().ok());
                if let (Some(min), Some(max), Some(width)) = (min, max, width) {
                    if min >= 1 && max >= min && max - min < MAX_COLUMN_SPAN {
                        for col in min..=max {
                            layout.column_widths.insert(col - 1, width);
                        }
                    }
                }
            }
            b"row" => {
                let row: Option<u32> = attr(e, b"r").and_then(|v| v.parse().ok());
                let height: Option<f64> = attr(e, b"ht").and_then(|v| v.parse().ok());
                if let (Some(row), Some(height)) = (row, height) {
                    if row >= 1 {
                        layout.row_heights.insert(row - 1, height);
                    }
                }
            }
            b"c" => {
                let coord = attr(e, b"r").and_then(|r| parse_a1(&r));
                let style: usize = attr(e, b"s").and_then(|v| v.parse().ok()).unwrap_or(0);
                if let (Some(coord), true) = (coord, style > 0) {
                    layout.cell_styles.push((coord, style));
                }
            }
            b"mergeCell" => {
                if let Some(range) = attr(e, b"ref").and_then(|r| CellRange::parse(&r)) {
                    layout.merged_regions.push(range);
                }
            }
            b"hyperlink" => {
                if let Some(coord) = attr(e, b"ref").and_then(|r| parse_a1(&r)) {
                    links.push(HyperlinkRef {
                        coord,
                        rel_id: attr(e, b"r:id"),
                        location: attr(e, b"location"),
                        tooltip: attr(e, b"tooltip"),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((layout, links))
}
