use log::{debug, info};
use sitemap::{
    reader::{SiteMapEntity, SiteMapReader},
    structs::Location,
};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::fetch::Fetcher;

/// Looks up a policy URL in the site's `sitemap.xml`.
///
/// Issues a single request to `{origin}/sitemap.xml` and returns the first `<loc>`
/// entry matching any of the keywords. Nested sitemaps are not followed.
///
/// # Errors
///
/// Returns `NotFound` if the sitemap is missing or has no matching entry, a network
/// error if the request fails, or a parse error if the XML is malformed.
pub async fn find_in_sitemap(fetcher: &Fetcher, origin: &Url, keywords: &[&str]) -> Result<Url> {
    let sitemap_url = origin.join("/sitemap.xml")?;
    let response = fetcher.get(&sitemap_url).await?;

    if !response.status().is_success() {
        debug!("{sitemap_url} answered {}", response.status());
        return Err(PipelineError::NotFound(format!(
            "sitemap {sitemap_url} is not available"
        )));
    }

    let content = response.bytes().await?;
    let url = match_sitemap(&content, keywords)?;
    info!("Found {url} in {sitemap_url}");

    Ok(url)
}

/// Returns the first `<url><loc>` of a sitemap document containing any keyword.
///
/// Entries whose `<loc>` is not an absolute URL are skipped.
///
/// # Errors
///
/// Returns a parse error on malformed XML, or `NotFound` if no entry matches.
pub fn match_sitemap(content: &[u8], keywords: &[&str]) -> Result<Url> {
    let reader = SiteMapReader::new(content);

    for entity in reader {
        match entity {
            SiteMapEntity::Url(url_entry) => match url_entry.loc {
                Location::Url(url) => {
                    let loc = url.as_str().to_lowercase();
                    if keywords.iter().any(|keyword| loc.contains(keyword)) {
                        return Ok(url);
                    }
                }
                Location::ParseErr(error) => {
                    debug!("Skipping sitemap entry without an absolute URL: {error}");
                }
                Location::None => debug!("Skipping sitemap entry without <loc>"),
            },
            SiteMapEntity::SiteMap(_) => continue,
            SiteMapEntity::Err(error) => {
                return Err(PipelineError::Parse(format!("malformed sitemap: {error}")));
            }
        }
    }

    Err(PipelineError::NotFound(
        "no matching sitemap entry".to_string(),
    ))
}
