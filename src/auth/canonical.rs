/// Build the canonical parameter string used as HMAC input
///
/// Keys are sorted by byte-wise ascending order (not locale aware, not case folded),
/// each pair is rendered as `key=value` and pairs are joined with `&`.
/// Nothing is escaped: keys or values containing `=` or `&` go through verbatim,
/// because the gateway recomputes the signature over the unescaped form.
pub fn canonicalize<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = params.into_iter().collect();

    pairs.sort_by(|a, b| a.0.as_ref().as_bytes().cmp(b.0.as_ref().as_bytes()));

    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join("&")
}
