//! Slug derivation and uniqueness probing.

use crate::error::AppError;
use crate::store::Store;

/// Map a title to a URL-safe identifier.
///
/// Lowercases, trims, drops every character that is not a lowercase ASCII
/// letter, digit, whitespace, or hyphen, then collapses whitespace and hyphen
/// runs into a single hyphen. Non-ASCII letters are deleted rather than
/// transliterated, so `"Café"` becomes `"caf"`. The result may be empty when
/// the title contains no permitted characters.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.trim().chars() {
        let c = match c {
            'a'..='z' | '0'..='9' => c,
            '-' => '-',
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if c == '-' {
            pending_hyphen = true;
        } else {
            if pending_hyphen {
                out.push('-');
                pending_hyphen = false;
            }
            out.push(c);
        }
    }
    // Trailing whitespace was trimmed away, so a pending run here came from
    // literal hyphens and survives as a single one.
    if pending_hyphen {
        out.push('-');
    }
    out
}

/// Find the first free variant of `base`, probing `base`, `base-1`,
/// `base-2`, … against the store while ignoring the record's own id.
///
/// The probe is check-then-set and not atomic against concurrent writers;
/// the store's unique slug index is the final backstop.
pub fn unique_slug(store: &Store, base: &str, own_id: &str) -> Result<String, AppError> {
    let mut candidate = base.to_string();
    let mut counter = 1u64;
    while store.slug_in_use(&candidate, own_id)? {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Amazing JavaScript Conference"), "amazing-javascript-conference");
        assert_eq!(slugify("React Summit 2024"), "react-summit-2024");
    }

    #[test]
    fn trims_and_collapses_runs() {
        assert_eq!(slugify("  Hello   World!  "), "hello-world");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("a---b"), "a-b");
    }

    #[test]
    fn non_ascii_letters_are_deleted_not_transliterated() {
        assert_eq!(slugify("Café"), "caf");
        assert_eq!(slugify("Überconf"), "berconf");
    }

    #[test]
    fn may_return_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn idempotent_on_already_slugged_input() {
        for s in ["react-summit-2024", "a", "a-b-c-1"] {
            assert_eq!(slugify(s), s);
            assert_eq!(slugify(&slugify(s)), slugify(s));
        }
    }

    #[test]
    fn probe_skips_taken_slugs_but_not_own() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().to_path_buf()).unwrap();
        store.claim_slug_for_test("rust-meetup", "id-a");
        store.claim_slug_for_test("rust-meetup-1", "id-b");

        // Another record must step past both taken variants.
        assert_eq!(unique_slug(&store, "rust-meetup", "id-z").unwrap(), "rust-meetup-2");
        // The owner of the base slug keeps it.
        assert_eq!(unique_slug(&store, "rust-meetup", "id-a").unwrap(), "rust-meetup");
        // A fresh base is accepted as-is.
        assert_eq!(unique_slug(&store, "other", "id-z").unwrap(), "other");
    }
}
