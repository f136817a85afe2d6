/// Month synonyms, all lowercase. The first entry of each row is the
/// canonical two-digit form.
const MONTH_SYNONYMS: [&[&str]; 12] = [
    &["01", "1", "jan", "january", "gen", "gennaio"],
    &["02", "2", "feb", "february", "febbraio"],
    &["03", "3", "mar", "march", "marzo"],
    &["04", "4", "apr", "april", "aprile"],
    &["05", "5", "may", "mag", "maggio"],
    &["06", "6", "jun", "june", "giu", "giugno"],
    &["07", "7", "jul", "july", "lug", "luglio"],
    &["08", "8", "aug", "august", "ago", "agosto"],
    &["09", "9", "sep", "sept", "september", "set", "sett", "settembre"],
    &["10", "oct", "october", "ott", "ottobre"],
    &["11", "nov", "november", "novembre"],
    &["12", "dec", "december", "dic", "dicembre"],
];

/// Resolves a captured month token to its zero-padded number.
pub fn resolve_month(token: &str) -> Option<&'static str> {
    let key = token.to_lowercase();
    MONTH_SYNONYMS
        .iter()
        .find(|row| row.contains(&key.as_str()))
        .map(|row| row[0])
}

/// Every alphabetic month name, longest first so that an alternation built
/// from it prefers `aprile` over `apr`.
pub fn month_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = MONTH_SYNONYMS
        .iter()
        .flat_map(|row| row.iter().copied())
        .filter(|name| name.chars().all(|c| c.is_ascii_alphabetic()))
        .collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names
}
