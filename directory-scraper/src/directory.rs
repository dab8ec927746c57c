//! Listing directory parsing.
//!
//! Three member-directory layouts are recognized from static HTML:
//!
//! - GrowthZone: `.gz-cards` with `.card-title a` profile links; profiles
//!   carry schema.org microdata inside `.details-links`.
//! - ChamberMaster: `.ccaMemListing` entries with `.ccaMemProfileLnk a`
//!   links and `.ccaNext` pagination; profiles use `cca*` classes.
//! - Card grid: `a.SFcrd` cards; profiles carry microdata inside `.SFbizctc`.
//!
//! Functions take raw HTML and return owned values so callers can hold the
//! results across `.await` points.

use normalizers::{expand_state_code, format_phone};
use scraper::{ElementRef, Html, Selector};
use shared_types::CompanyInput;
use url::Url;

use crate::error::DirectoryLayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryLayout {
    GrowthZone,
    ChamberMaster,
    CardGrid,
}

impl DirectoryLayout {
    pub fn name(&self) -> &'static str {
        match self {
            DirectoryLayout::GrowthZone => "growthzone",
            DirectoryLayout::ChamberMaster => "chambermaster",
            DirectoryLayout::CardGrid => "card-grid",
        }
    }

    /// Whether listing pages link to further pages.
    pub fn paginates(&self) -> bool {
        matches!(self, DirectoryLayout::ChamberMaster)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub profile_urls: Vec<String>,
    pub next_page: Option<String>,
}

fn selector(css: &str) -> Result<Selector, DirectoryLayoutError> {
    Selector::parse(css).map_err(|e| DirectoryLayoutError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Result<String, DirectoryLayoutError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).next().map(text_of).unwrap_or_default())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Adds `https://` when the scheme is missing.
pub fn normalize_directory_url(raw: &str) -> Result<Url, DirectoryLayoutError> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    Url::parse(&with_scheme).map_err(|e| DirectoryLayoutError::InvalidUrl(e.to_string()))
}

pub fn detect_layout(html: &str) -> Result<Option<DirectoryLayout>, DirectoryLayoutError> {
    let document = Html::parse_document(html);
    let candidates = [
        (r#"[class*="gz-cards"]"#, DirectoryLayout::GrowthZone),
        (r#"[class*=" ccaMemListing "]"#, DirectoryLayout::ChamberMaster),
        (r#"[class*="SFcrd"]"#, DirectoryLayout::CardGrid),
    ];

    for (css, layout) in candidates {
        if document.select(&selector(css)?).next().is_some() {
            return Ok(Some(layout));
        }
    }
    Ok(None)
}

/// Profile links (absolute, de-duplicated, in page order) and the next page.
pub fn parse_listing_page(
    html: &str,
    layout: DirectoryLayout,
    base: &Url,
) -> Result<ListingPage, DirectoryLayoutError> {
    let document = Html::parse_document(html);

    let link_css = match layout {
        DirectoryLayout::GrowthZone => ".gz-cards .card-title a",
        DirectoryLayout::ChamberMaster => {
            r#"[class*=" ccaMemListing "] [class*="ccaMemProfileLnk"] a"#
        }
        DirectoryLayout::CardGrid => "a.SFcrd",
    };

    let mut page = ListingPage::default();
    for link in document.select(&selector(link_css)?) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(absolute) = base.join(href) else {
            continue;
        };
        let absolute = absolute.to_string();
        if !page.profile_urls.contains(&absolute) {
            page.profile_urls.push(absolute);
        }
    }

    if layout.paginates() {
        page.next_page = document
            .select(&selector(r#"[class*="ccaNext"]"#)?)
            .next()
            .and_then(|next| next.value().attr("href"))
            .filter(|href| !href.trim().is_empty() && !href.starts_with('#'))
            .and_then(|href| base.join(href).ok())
            .map(|url| url.to_string());
    }

    Ok(page)
}

/// Company fields found on a profile page. Missing values stay `None`.
pub fn parse_profile(html: &str, layout: DirectoryLayout) -> Result<CompanyInput, DirectoryLayoutError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    match layout {
        DirectoryLayout::GrowthZone => {
            let container = document
                .select(&selector(r#"[class*="details-links"]"#)?)
                .next()
                .unwrap_or(root);
            let mut input = parse_microdata(container)?;
            input.company_name = non_empty(first_text(root, "h1")?);
            Ok(input)
        }
        DirectoryLayout::CardGrid => {
            let container = document
                .select(&selector(r#"[class*="SFbizctc"]"#)?)
                .next()
                .unwrap_or(root);
            let mut input = parse_microdata(container)?;
            input.company_name = non_empty(first_text(container, r#"h3[itemprop="name"]"#)?);
            Ok(input)
        }
        DirectoryLayout::ChamberMaster => parse_chamber_master(root),
    }
}

fn parse_microdata(scope: ElementRef<'_>) -> Result<CompanyInput, DirectoryLayoutError> {
    let phone = first_text(scope, r#"[itemprop="telephone"]"#)?;
    let state = first_text(scope, r#"[itemprop*="addressRegion"]"#)?;
    let website = scope
        .select(&selector(r#"[itemprop="url"]"#)?)
        .next()
        .and_then(|link| link.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    Ok(CompanyInput {
        street_address: non_empty(first_text(scope, r#"[itemprop*="streetAddress"]"#)?),
        city: non_empty(first_text(scope, r#"[itemprop*="addressLocality"]"#)?),
        state: non_empty(expand_state(&state)),
        postal_code: non_empty(first_text(scope, r#"[itemprop*="postalCode"]"#)?),
        phone_number: non_empty(format_phone(&phone).formatted),
        website_url: non_empty(website),
        ..Default::default()
    })
}

fn parse_chamber_master(root: ElementRef<'_>) -> Result<CompanyInput, DirectoryLayoutError> {
    let address_parts: Vec<String> = root
        .select(&selector(r#"[class*="ccaAddr"]"#)?)
        .next()
        .map(|addr| {
            addr.text()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let address = split_address(&address_parts);

    Ok(CompanyInput {
        company_name: non_empty(first_text(root, r#"[class*="ccaNameBlock"]"#)?),
        phone_number: non_empty(first_text(root, r#"[class*="ccaPhone"]"#)?),
        website_url: non_empty(first_text(root, r#"[class*="ccaWebAddr"]"#)?),
        street_address: non_empty(address.street),
        city: non_empty(address.city),
        state: non_empty(expand_state(&address.state)),
        postal_code: non_empty(address.postal_code),
        ..Default::default()
    })
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SplitAddress {
    street: String,
    city: String,
    state: String,
    postal_code: String,
}

/// `["100 Main St", "Suite 2", "Tyler, TX 75701"]`: every line but the last
/// is street, the last is `city, STATE ZIP`.
fn split_address(lines: &[String]) -> SplitAddress {
    let Some((last, street_lines)) = lines.split_last() else {
        return SplitAddress::default();
    };

    let mut address = SplitAddress {
        street: street_lines.join(" "),
        ..Default::default()
    };

    let Some((city, region)) = last.split_once(',') else {
        address.city = last.trim().to_string();
        return address;
    };
    address.city = city.trim().to_string();

    let mut tokens: Vec<&str> = region.split_whitespace().collect();
    if tokens
        .last()
        .is_some_and(|token| token.chars().next().is_some_and(|c| c.is_ascii_digit()))
    {
        let zip = tokens.pop().unwrap_or_default();
        address.postal_code = zip.chars().filter(char::is_ascii_digit).take(5).collect();
    }
    address.state = tokens.join(" ");
    address
}

fn expand_state(raw: &str) -> String {
    expand_state_code(raw)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}
