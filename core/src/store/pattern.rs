/// Redis `KEYS` glob matching: `*` matches any run of characters, `?` exactly
/// one, `\` escapes the next character. Character classes are not supported.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();
    let (mut pi, mut ki) = (0, 0);
    // position of the last `*` seen and the key index it was tried against
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        match p.get(pi) {
            Some('*') => {
                star = Some((pi, ki));
                pi += 1;
                continue;
            }
            Some('?') => {
                pi += 1;
                ki += 1;
                continue;
            }
            Some('\\') if pi + 1 < p.len() && p[pi + 1] == k[ki] => {
                pi += 2;
                ki += 1;
                continue;
            }
            Some(c) if *c != '\\' && *c == k[ki] => {
                pi += 1;
                ki += 1;
                continue;
            }
            _ => {}
        }
        match star {
            Some((sp, sk)) => {
                pi = sp + 1;
                ki = sk + 1;
                star = Some((sp, sk + 1));
            }
            None => return false,
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

/// Literal prefix of a pattern, up to the first wildcard or escape.
pub fn literal_prefix(pattern: &str) -> &str {
    let end = pattern.find(['*', '?', '\\', '[']).unwrap_or(pattern.len());
    &pattern[..end]
}
