//! HTML parsers for the catalog's two page layouts
//!
//! This module extracts structured data from the two page shapes the crawler
//! visits:
//!
//! - list pages: a pagination footer (from which the maximum page index is
//!   discovered) and an item table of name→link rows
//! - detail pages: an info panel with the item name, requirement text, and
//!   image, from which the record and its derived key are built
//!
//! The derived key comes from the image filename: the filename is normalized
//! (leading letter lowercased, the color token's casing folded), the prefix
//! up to the first underscore is stripped, and race-code casing is folded to
//! its canonical form. Distinct item names can normalize to the same key;
//! that collapse is handled by the record store, not here.

use crate::catalog::{Category, DetailRecord};
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Pagination footer entries on a list page
const LIST_PAGER_SELECTOR: &str = "#content .main .con-box .page .page-change .yiiPager .page a";

/// Item-table bodies on a list page; the first tbody holds the header row
const LIST_TABLE_SELECTOR: &str = "#content .main .con-box .tb-list tbody";

/// Info panel on a detail page
const DETAIL_PANEL_SELECTOR: &str = "#content .main .panel-btm .panel-top";

/// Canonical race-code spellings used in image filenames
const RACE_CODES: &[&str] = &["GonM", "GonF", "JinM", "JinF", "KunN", "LynM", "LynF"];

/// The one item whose image filename carries no numeric code; its key and
/// code are substituted instead of failing the run.
const CODELESS_ITEM_NAME: &str = "洪门道服";
const CODELESS_ITEM_KEY: &str = "60054_all";
const CODELESS_ITEM_CODE: &str = "60054";

/// Extracted content of one list page
#[derive(Debug, Clone)]
pub struct ParsedListPage {
    /// Highest page index shown in this page's pagination footer
    pub max_page: u32,

    /// (name, link) pairs from the item table, in page order
    pub items: Vec<(String, Url)>,
}

/// Extracted content of one detail page
#[derive(Debug, Clone)]
pub struct ParsedDetailPage {
    /// Derived record key (see module docs)
    pub key: String,

    /// The extracted record, image URL included
    pub record: DetailRecord,

    /// True when the image filename carried no color-variant token and
    /// `col` was substituted with `"all"`
    pub col_missing: bool,
}

fn selector(raw: &'static str) -> Selector {
    // All selectors in this module are static and known-valid.
    Selector::parse(raw).expect("static selector")
}

/// Parses a list page into its pagination maximum and item links
///
/// Fatal if the pagination footer yields no page numbers or the item table
/// is absent/empty: either means the site layout changed under us.
pub fn parse_list_page(
    html: &str,
    page: u32,
    base_url: &Url,
) -> Result<ParsedListPage, ParseError> {
    let document = Html::parse_document(html);

    // Pagination footer: the maximum page index ever shown anywhere in it.
    let max_page = document
        .select(&selector(LIST_PAGER_SELECTOR))
        .filter_map(|a| element_text(&a).parse::<u32>().ok())
        .max()
        .ok_or(ParseError::ListPagerMissing { page })?;

    // Item table: tbody 0 is the header, tbody 1 holds the rows.
    let table = document
        .select(&selector(LIST_TABLE_SELECTOR))
        .nth(1)
        .ok_or(ParseError::ListItemsMissing { page })?;

    let row_selector = selector("tr");
    let cell_selector = selector("td");
    let link_selector = selector("a");
    let name_selector = selector("span");

    let mut items = Vec::new();
    for (index, row) in table.select(&row_selector).enumerate() {
        // Cell 0 is the thumbnail; cell 1 carries the name and link.
        let cell = row
            .select(&cell_selector)
            .nth(1)
            .ok_or(ParseError::ListItemMalformed { page, index })?;

        let href = cell
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or(ParseError::ListItemMalformed { page, index })?;

        let link = base_url
            .join(href)
            .map_err(|_| ParseError::ListItemMalformed { page, index })?;

        let name = cell
            .select(&name_selector)
            .next()
            .map(|span| element_text(&span))
            .ok_or(ParseError::ListItemMalformed { page, index })?;

        items.push((name, link));
    }

    if items.is_empty() {
        return Err(ParseError::ListItemsMissing { page });
    }

    Ok(ParsedListPage { max_page, items })
}

/// Parses a detail page into a record plus its derived key
///
/// `list_name` is the display name the link was collected under; it is only
/// used in error messages before the page's own name is known.
pub fn parse_detail_page(
    html: &str,
    list_name: &str,
    link: &Url,
    category: Category,
) -> Result<ParsedDetailPage, ParseError> {
    let document = Html::parse_document(html);

    let panel = document
        .select(&selector(DETAIL_PANEL_SELECTOR))
        .next()
        .ok_or_else(|| ParseError::DetailPanelMissing {
            name: list_name.to_string(),
        })?;

    let name = panel
        .select(&selector("h2"))
        .next()
        .map(|h2| element_text(&h2))
        .ok_or_else(|| ParseError::DetailPanelMissing {
            name: list_name.to_string(),
        })?;

    let piclink = panel
        .select(&selector(".icon img"))
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or_else(|| ParseError::DetailImageMissing { name: name.clone() })?
        .to_string();

    let require = panel
        .select(&selector(".focus"))
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let pic = normalize_pic_filename(&piclink);

    let (key, code) = match first_digit_run(&pic) {
        Some(code) => (derive_record_key(&pic), code),
        // One item in the catalog ships a codeless image filename; every
        // other case means the filename scheme changed and the run must stop.
        None if name == CODELESS_ITEM_NAME => (
            CODELESS_ITEM_KEY.to_string(),
            CODELESS_ITEM_CODE.to_string(),
        ),
        None => {
            return Err(ParseError::CodeMissing {
                name,
                pic,
            })
        }
    };

    let (col, col_missing) = match find_color_variant(&pic) {
        Some(col) => (col, false),
        None => ("all".to_string(), true),
    };

    Ok(ParsedDetailPage {
        key,
        record: DetailRecord {
            name,
            code,
            col,
            category,
            require,
            pic,
            piclink,
            link: link.to_string(),
        },
        col_missing,
    })
}

/// Normalizes an image URL into the filename records and files are keyed by
///
/// Takes the path segment after the last `/`, lowercases the first letter
/// (`Costume_` → `costume_`), and folds the first case-insensitive `col`
/// occurrence to lowercase (`Col2` → `col2`).
pub fn normalize_pic_filename(piclink: &str) -> String {
    let file = piclink.rsplit('/').next().unwrap_or(piclink);
    let lowered = lcfirst(file);
    replace_ascii_ci_first(&lowered, "col", "col")
}

/// Derives the record key from a normalized image filename
///
/// Strips the prefix up to the first underscore and the extension, then
/// folds race-code casing to its canonical spelling, e.g.
/// `costume_60094_gonf_col1.png` → `60094_GonF_col1`.
pub fn derive_record_key(pic: &str) -> String {
    let start = pic.find('_').map(|i| i + 1).unwrap_or(0);
    let end = pic.find('.').unwrap_or(pic.len());
    normalize_race_codes(pic.get(start..end).unwrap_or(""))
}

/// First run of consecutive ASCII digits, if any
fn first_digit_run(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let start = bytes.iter().position(|b| b.is_ascii_digit())?;
    let run: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some(run)
}

/// Color-variant token (`col` + digits, either casing), lowercased
fn find_color_variant(s: &str) -> Option<String> {
    let lower = s.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find("col").map(|i| i + from) {
        let digits: String = lower[pos + 3..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if !digits.is_empty() {
            return Some(format!("col{}", digits));
        }
        from = pos + 3;
    }
    None
}

/// Folds every race-code occurrence to its canonical casing
fn normalize_race_codes(raw: &str) -> String {
    let mut result = raw.to_string();
    for code in RACE_CODES {
        result = replace_ascii_ci_all(&result, code, code);
    }
    result
}

/// Collected, trimmed text content of an element
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces the first ASCII-case-insensitive occurrence of `needle`
fn replace_ascii_ci_first(haystack: &str, needle: &str, replacement: &str) -> String {
    match find_ascii_ci(haystack, needle, 0) {
        Some(pos) => {
            let mut out = String::with_capacity(haystack.len());
            out.push_str(&haystack[..pos]);
            out.push_str(replacement);
            out.push_str(&haystack[pos + needle.len()..]);
            out
        }
        None => haystack.to_string(),
    }
}

/// Replaces every ASCII-case-insensitive occurrence of `needle`
fn replace_ascii_ci_all(haystack: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut from = 0;
    while let Some(pos) = find_ascii_ci(haystack, needle, from) {
        out.push_str(&haystack[from..pos]);
        out.push_str(replacement);
        from = pos + needle.len();
    }
    out.push_str(&haystack[from..]);
    out
}

fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let haystack_lower = haystack.to_ascii_lowercase();
    let needle_lower = needle.to_ascii_lowercase();
    haystack_lower[from..]
        .find(&needle_lower)
        .map(|pos| pos + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("http://cha.17173.com/bns/fashion/search.html?type=body").unwrap()
    }

    fn list_page_html(max_page: u32, items: &[(&str, &str)]) -> String {
        let pager: String = (1..=max_page)
            .map(|n| format!(r#"<li class="page"><a>{}</a></li>"#, n))
            .collect();
        let rows: String = items
            .iter()
            .map(|(name, href)| {
                format!(
                    r#"<tr><td><a href="{href}"><img src="/thumb.png"></a></td><td><a href="{href}"><span>{name}</span></a></td></tr>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><div id="content"><div class="main"><div class="con-box">
            <table class="tb-list"><tbody><tr><th>名称</th></tr></tbody><tbody>{rows}</tbody></table>
            <div class="page"><div class="page-change"><ul class="yiiPager">{pager}</ul></div></div>
            </div></div></div></body></html>"#
        )
    }

    fn detail_page_html(name: &str, pic_src: &str, require: &str) -> String {
        format!(
            r#"<html><body><div id="content"><div class="main"><div class="panel-btm">
            <div class="panel-top"><h2>{name}</h2>
            <div class="icon"><img src="{pic_src}"></div>
            <p class="focus">{require}</p>
            </div></div></div></div></body></html>"#
        )
    }

    #[test]
    fn test_parse_list_page_extracts_max_and_items() {
        let html = list_page_html(
            3,
            &[
                ("红宝石", "/bns/fashion/90046.html"),
                ("白玫瑰", "/bns/fashion/2090880.html"),
            ],
        );
        let parsed = parse_list_page(&html, 1, &base_url()).unwrap();

        assert_eq!(parsed.max_page, 3);
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].0, "红宝石");
        assert_eq!(
            parsed.items[0].1.as_str(),
            "http://cha.17173.com/bns/fashion/90046.html"
        );
    }

    #[test]
    fn test_parse_list_page_without_pager_is_fatal() {
        let html = r#"<html><body><div id="content"><div class="main"><div class="con-box">
            <table class="tb-list"><tbody><tr><th>h</th></tr></tbody><tbody>
            <tr><td></td><td><a href="/x.html"><span>x</span></a></td></tr>
            </tbody></table></div></div></div></body></html>"#;
        assert!(matches!(
            parse_list_page(html, 2, &base_url()),
            Err(ParseError::ListPagerMissing { page: 2 })
        ));
    }

    #[test]
    fn test_parse_list_page_without_item_table_is_fatal() {
        let html = r#"<html><body><div id="content"><div class="main"><div class="con-box">
            <div class="page"><div class="page-change"><ul class="yiiPager">
            <li class="page"><a>1</a></li></ul></div></div>
            </div></div></div></body></html>"#;
        assert!(matches!(
            parse_list_page(html, 1, &base_url()),
            Err(ParseError::ListItemsMissing { page: 1 })
        ));
    }

    #[test]
    fn test_parse_list_page_skips_non_numeric_pager_entries() {
        let html = list_page_html(2, &[("a", "/a.html")])
            .replace("</ul>", r#"<li class="page"><a>下一页</a></li></ul>"#);
        let parsed = parse_list_page(&html, 1, &base_url()).unwrap();
        assert_eq!(parsed.max_page, 2);
    }

    #[test]
    fn test_parse_detail_page_full_record() {
        let html = detail_page_html(
            "红宝石",
            "http://i1.17173cdn.com/images/data/fashion/big/Costume_60094_GonF_col1.png",
            "龙女专用",
        );
        let link = Url::parse("http://cha.17173.com/bns/fashion/90046.html").unwrap();
        let parsed = parse_detail_page(&html, "红宝石", &link, Category::Body).unwrap();

        assert_eq!(parsed.key, "60094_GonF_col1");
        assert!(!parsed.col_missing);

        let record = parsed.record;
        assert_eq!(record.name, "红宝石");
        assert_eq!(record.code, "60094");
        assert_eq!(record.col, "col1");
        assert_eq!(record.category, Category::Body);
        assert_eq!(record.require, "龙女专用");
        assert_eq!(record.pic, "costume_60094_GonF_col1.png");
        assert_eq!(record.link, "http://cha.17173.com/bns/fashion/90046.html");
    }

    #[test]
    fn test_parse_detail_page_missing_col_substitutes_all() {
        let html = detail_page_html(
            "天羽",
            "http://i1.17173cdn.com/images/Costume_60120_JinF.png",
            "全种族通用",
        );
        let link = Url::parse("http://cha.17173.com/bns/fashion/91000.html").unwrap();
        let parsed = parse_detail_page(&html, "天羽", &link, Category::Hair).unwrap();

        assert!(parsed.col_missing);
        assert_eq!(parsed.record.col, "all");
        assert_eq!(parsed.key, "60120_JinF");
    }

    #[test]
    fn test_parse_detail_page_codeless_special_case() {
        let html = detail_page_html(
            "洪门道服",
            "http://i1.17173cdn.com/images/Costume_HongmenDobok.png",
            "全种族通用",
        );
        let link = Url::parse("http://cha.17173.com/bns/fashion/90001.html").unwrap();
        let parsed = parse_detail_page(&html, "洪门道服", &link, Category::Body).unwrap();

        assert_eq!(parsed.key, "60054_all");
        assert_eq!(parsed.record.code, "60054");
    }

    #[test]
    fn test_parse_detail_page_codeless_other_item_is_fatal() {
        let html = detail_page_html(
            "神秘衣装",
            "http://i1.17173cdn.com/images/Costume_Mystery.png",
            "全种族通用",
        );
        let link = Url::parse("http://cha.17173.com/bns/fashion/90002.html").unwrap();
        let result = parse_detail_page(&html, "神秘衣装", &link, Category::Body);

        assert!(matches!(result, Err(ParseError::CodeMissing { .. })));
    }

    #[test]
    fn test_parse_detail_page_without_panel_is_fatal() {
        let html = "<html><body><div id='content'></div></body></html>";
        let link = Url::parse("http://cha.17173.com/bns/fashion/90003.html").unwrap();
        assert!(matches!(
            parse_detail_page(html, "绅士", &link, Category::Body),
            Err(ParseError::DetailPanelMissing { .. })
        ));
    }

    #[test]
    fn test_normalize_pic_filename() {
        assert_eq!(
            normalize_pic_filename("http://cdn.example.com/a/b/Costume_60094_GonF_col1.png"),
            "costume_60094_GonF_col1.png"
        );
        // Upper-case color token is folded
        assert_eq!(
            normalize_pic_filename("http://cdn.example.com/Costume_60055_JinM_Col2.png"),
            "costume_60055_JinM_col2.png"
        );
    }

    #[test]
    fn test_derive_record_key_normalizes_race_casing() {
        assert_eq!(
            derive_record_key("costume_60094_gonf_col1.png"),
            "60094_GonF_col1"
        );
        assert_eq!(
            derive_record_key("costume_60055_JINM_col2.png"),
            "60055_JinM_col2"
        );
        assert_eq!(derive_record_key("costume_60120_KunN.png"), "60120_KunN");
    }

    #[test]
    fn test_first_digit_run() {
        assert_eq!(first_digit_run("costume_60094_GonF_col1.png").as_deref(), Some("60094"));
        assert_eq!(first_digit_run("costume_nocode.png"), None);
    }

    #[test]
    fn test_find_color_variant() {
        assert_eq!(
            find_color_variant("costume_60094_GonF_col12.png").as_deref(),
            Some("col12")
        );
        // "col" without digits does not count
        assert_eq!(find_color_variant("costume_collar_GonF.png"), None);
        assert_eq!(find_color_variant("costume_60094_GonF.png"), None);
    }
}
