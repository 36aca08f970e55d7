use super::CompressError;
use lopdf::Document;
use std::path::Path;
use tracing::{debug, info};

/// Widest xref stream field we accept, in bytes. Real writers use at most 4;
/// lopdf allocates rows of the declared width before checking them.
const MAX_XREF_FIELD_WIDTH: u64 = 8;

/// Rewrite the PDF at `input` into a smaller equivalent at `output`.
///
/// Unreferenced objects and empty streams are dropped, uncompressed streams
/// are Flate-encoded and objects are renumbered densely before saving with
/// default settings. When that rewrite is not smaller, or loses pages, the
/// original bytes are written instead.
pub fn compress_pdf(input: &Path, output: &Path) -> Result<(), CompressError> {
    let original = std::fs::read(input)?;
    check_xref_widths(&original)?;

    let mut doc = Document::load_mem(&original)?;
    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(CompressError::EmptyPdf);
    }

    let pruned = doc.prune_objects();
    let emptied = doc.delete_zero_length_streams();
    doc.compress();
    doc.renumber_objects();

    let kept_pages = doc.get_pages().len();
    debug!(
        "PDF optimize: {} pages, pruned {} objects, removed {} empty streams",
        kept_pages,
        pruned.len(),
        emptied.len()
    );

    let mut rewritten = Vec::new();
    doc.save_to(&mut rewritten)?;

    if kept_pages == page_count && rewritten.len() < original.len() {
        std::fs::write(output, &rewritten)?;
    } else {
        info!(
            "PDF rewrite kept as original: {} -> {} bytes, {} -> {} pages",
            original.len(),
            rewritten.len(),
            page_count,
            kept_pages
        );
        std::fs::write(output, &original)?;
    }

    Ok(())
}

/// Reject cross-reference streams whose `/W` field widths are absurd.
fn check_xref_widths(bytes: &[u8]) -> Result<(), CompressError> {
    let mut from = 0;
    while let Some(pos) = find(&bytes[from..], b"/XRef") {
        let at = from + pos;
        from = at + 5;

        // `/XRefStm` is a trailer key, not an xref stream
        if bytes.get(at + 5).is_some_and(|b| b.is_ascii_alphanumeric()) {
            continue;
        }

        let start = rfind(&bytes[..at], b"obj").map_or(0, |i| i + 3);
        let end = find(&bytes[at..], b"stream").map_or(bytes.len(), |i| at + i);

        if let Some(widths) = xref_widths(&bytes[start..end]) {
            let widths = widths?;
            if widths.len() != 3 || widths.iter().any(|w| *w > MAX_XREF_FIELD_WIDTH) {
                return Err(CompressError::MalformedPdf(format!(
                    "xref stream field widths {:?}",
                    widths
                )));
            }
        }
    }
    Ok(())
}

/// The `/W [a b c]` entry of a dictionary slice, if present.
fn xref_widths(dict: &[u8]) -> Option<Result<Vec<u64>, CompressError>> {
    let mut from = 0;
    while let Some(pos) = find(&dict[from..], b"/W") {
        let at = from + pos + 2;
        from = at;

        let rest = &dict[at..];
        let skip = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
        if rest.get(skip) != Some(&b'[') {
            continue;
        }

        let body = &rest[skip + 1..];
        let close = body.iter().position(|b| *b == b']').unwrap_or(body.len());
        let widths = String::from_utf8_lossy(&body[..close])
            .split_ascii_whitespace()
            .map(|token| {
                token.parse::<u64>().map_err(|_| {
                    CompressError::MalformedPdf(format!("xref stream field width {:?}", token))
                })
            })
            .collect();
        return Some(widths);
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
