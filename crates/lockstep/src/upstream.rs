//! imara-diff backed diff source: aligned rows and char-level parts

use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};
use lockstep_core::{CharDiff, CharPart, DiffRow, DiffSource, PartKind, SideKind, SideLine};
use rustc_hash::FxHashMap;

/// Lines below this similarity are shown as a removal plus an addition
const SIMILARITY_THRESHOLD: f32 = 0.3;

/// Hunks larger than this (removed x added) skip similarity pairing
const MAX_PAIRING_CELLS: usize = 40_000;

/// Lines split on `\n` exactly like the editor document splits them, so a
/// trailing newline yields a final empty line on both sides
struct Lines<'a>(&'a str);

impl<'a> TokenSource for Lines<'a> {
    type Token = &'a str;
    type Tokenizer = std::str::Split<'a, char>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.split('\n')
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.bytes().filter(|b| *b == b'\n').count() as u32 + 1
    }
}

struct Chars<'a>(&'a str);

impl<'a> TokenSource for Chars<'a> {
    type Token = char;
    type Tokenizer = std::str::Chars<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.chars()
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.len() as u32
    }
}

/// Line-level differ producing side-by-side rows
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDiffer;

impl DiffSource for LineDiffer {
    fn diff_rows(&self, left: &str, right: &str) -> Vec<DiffRow> {
        let old: Vec<&str> = left.split('\n').collect();
        let new: Vec<&str> = right.split('\n').collect();
        let input = InternedInput::new(Lines(left), Lines(right));
        let diff = Diff::compute(Algorithm::Histogram, &input);

        let mut rows = Vec::with_capacity(old.len().max(new.len()));
        let (mut i, mut j) = (0usize, 0usize);
        for hunk in diff.hunks() {
            let before = hunk.before.start as usize..hunk.before.end as usize;
            let after = hunk.after.start as usize..hunk.after.end as usize;
            push_unchanged(&mut rows, &old, &new, i..before.start, j);
            push_hunk(&mut rows, &old, &new, before.clone(), after.clone());
            i = before.end;
            j = after.end;
        }
        push_unchanged(&mut rows, &old, &new, i..old.len(), j);
        rows
    }
}

/// Char-level differ for modified rows
#[derive(Debug, Clone, Copy, Default)]
pub struct CharDiffer;

impl CharDiff for CharDiffer {
    fn diff_chars(&self, old: &str, new: &str) -> Vec<CharPart> {
        let a: Vec<char> = old.chars().collect();
        let b: Vec<char> = new.chars().collect();
        let input = InternedInput::new(Chars(old), Chars(new));
        let diff = Diff::compute(Algorithm::Myers, &input);

        let mut parts = Vec::new();
        let mut push = |chars: &[char], kind: PartKind| {
            if !chars.is_empty() {
                parts.push(CharPart::new(chars.iter().collect::<String>(), kind));
            }
        };
        let mut i = 0usize;
        for hunk in diff.hunks() {
            let (bs, be) = (hunk.before.start as usize, hunk.before.end as usize);
            let (as_, ae) = (hunk.after.start as usize, hunk.after.end as usize);
            push(&a[i..bs], PartKind::Equal);
            push(&a[bs..be], PartKind::Removed);
            push(&b[as_..ae], PartKind::Added);
            i = be;
        }
        push(&a[i..], PartKind::Equal);
        parts
    }
}

fn push_unchanged(
    rows: &mut Vec<DiffRow>,
    old: &[&str],
    new: &[&str],
    range: std::ops::Range<usize>,
    mut j: usize,
) {
    for i in range {
        let Some(right) = new.get(j) else {
            break;
        };
        rows.push(DiffRow::new(
            SideLine::new(SideKind::Unchanged, old[i], i + 1),
            SideLine::new(SideKind::Unchanged, *right, j + 1),
        ));
        j += 1;
    }
}

fn push_hunk(
    rows: &mut Vec<DiffRow>,
    old: &[&str],
    new: &[&str],
    before: std::ops::Range<usize>,
    after: std::ops::Range<usize>,
) {
    let removed = &old[before.clone()];
    let added = &new[after.clone()];
    for (l, r) in pair_lines(removed, added) {
        let row = match (l, r) {
            (Some(l), Some(r)) => {
                let (ln, rn) = (before.start + l, after.start + r);
                DiffRow::new(
                    SideLine::new(SideKind::Modified, old[ln], ln + 1).with_pair(new[rn]),
                    SideLine::new(SideKind::Modified, new[rn], rn + 1).with_pair(old[ln]),
                )
            }
            (Some(l), None) => {
                let ln = before.start + l;
                DiffRow::new(
                    SideLine::new(SideKind::Removed, old[ln], ln + 1),
                    SideLine::placeholder(),
                )
            }
            (None, Some(r)) => {
                let rn = after.start + r;
                DiffRow::new(
                    SideLine::placeholder(),
                    SideLine::new(SideKind::Added, new[rn], rn + 1),
                )
            }
            (None, None) => continue,
        };
        rows.push(row);
    }
}

/// Share of characters two lines have in common, relative to the longer one
fn similarity(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    let (longer, shorter, longer_len) = if len_a >= len_b {
        (a, b, len_a)
    } else {
        (b, a, len_b)
    };

    let mut pool: FxHashMap<char, usize> = FxHashMap::default();
    for c in longer.chars() {
        *pool.entry(c).or_insert(0) += 1;
    }
    let mut matches = 0usize;
    for c in shorter.chars() {
        if let Some(n) = pool.get_mut(&c) {
            if *n > 0 {
                *n -= 1;
                matches += 1;
            }
        }
    }
    matches as f32 / longer_len as f32
}

/// Pair removed and added lines of one hunk, most similar first.
///
/// Pairs never cross, so both sides keep their line order. Unpaired lines
/// come out as one-sided rows ahead of the next pair.
fn pair_lines(removed: &[&str], added: &[&str]) -> Vec<(Option<usize>, Option<usize>)> {
    let mut matched: Vec<(usize, usize)> = Vec::new();
    if removed.len().saturating_mul(added.len()) <= MAX_PAIRING_CELLS {
        let mut candidates = Vec::new();
        for (ri, r) in removed.iter().enumerate() {
            for (ai, a) in added.iter().enumerate() {
                let score = similarity(r, a);
                if score >= SIMILARITY_THRESHOLD {
                    candidates.push((ri, ai, score));
                }
            }
        }
        candidates.sort_by(|x, y| y.2.total_cmp(&x.2));

        let mut used_removed = vec![false; removed.len()];
        let mut used_added = vec![false; added.len()];
        for (ri, ai, _) in candidates {
            if !used_removed[ri] && !used_added[ai] {
                used_removed[ri] = true;
                used_added[ai] = true;
                matched.push((ri, ai));
            }
        }
        matched.sort_unstable();
        let mut last_added = None;
        matched.retain(|&(_, ai)| {
            let keep = last_added.map_or(true, |last| ai > last);
            if keep {
                last_added = Some(ai);
            }
            keep
        });
    }

    let mut out = Vec::with_capacity(removed.len() + added.len());
    let (mut ri, mut ai) = (0usize, 0usize);
    for (mr, ma) in matched {
        out.extend((ri..mr).map(|r| (Some(r), None)));
        out.extend((ai..ma).map(|a| (None, Some(a))));
        out.push((Some(mr), Some(ma)));
        ri = mr + 1;
        ai = ma + 1;
    }
    out.extend((ri..removed.len()).map(|r| (Some(r), None)));
    out.extend((ai..added.len()).map(|a| (None, Some(a))));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(rows: &[DiffRow]) -> Vec<(SideKind, SideKind)> {
        rows.iter().map(|r| (r.left.kind, r.right.kind)).collect()
    }

    #[test]
    fn test_identical_texts() {
        let rows = LineDiffer.diff_rows("a\nb\n", "a\nb\n");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.left.kind == SideKind::Unchanged));
    }

    #[test]
    fn test_pure_removal_and_addition() {
        let rows = LineDiffer.diff_rows("a\nb\nc", "a\nc\nd");
        assert_eq!(
            kinds(&rows),
            vec![
                (SideKind::Unchanged, SideKind::Unchanged),
                (SideKind::Removed, SideKind::Placeholder),
                (SideKind::Unchanged, SideKind::Unchanged),
                (SideKind::Placeholder, SideKind::Added),
            ]
        );
    }

    #[test]
    fn test_similar_lines_become_modified() {
        let left = "{\n  \"name\": \"lockstep\",\n}";
        let right = "{\n  \"name\": \"lockstep-core\",\n}";
        let rows = LineDiffer.diff_rows(left, right);
        assert_eq!(rows[1].left.kind, SideKind::Modified);
        assert_eq!(rows[1].left.pair_content.as_deref(), Some("  \"name\": \"lockstep-core\","));
        assert_eq!(rows[1].right.line_number, Some(2));
    }

    #[test]
    fn test_non_empty_sides_match_document_lines() {
        let left = "x\ny\nz\n";
        let right = "x\nQ\nR\nz\nextra";
        let rows = LineDiffer.diff_rows(left, right);
        let real_left = rows.iter().filter(|r| !r.left.is_placeholder()).count();
        let real_right = rows.iter().filter(|r| !r.right.is_placeholder()).count();
        assert_eq!(real_left, left.split('\n').count());
        assert_eq!(real_right, right.split('\n').count());
    }

    #[test]
    fn test_pairing_keeps_order() {
        // "bbbb" is most similar to "bbbx", which would cross the first pair
        let pairs = pair_lines(&["aaaa", "bbbb"], &["bbbx", "aaax"]);
        let mut left: Vec<_> = pairs.iter().filter_map(|p| p.0).collect();
        let mut right: Vec<_> = pairs.iter().filter_map(|p| p.1).collect();
        assert!(left.windows(2).all(|w| w[0] < w[1]));
        assert!(right.windows(2).all(|w| w[0] < w[1]));
        left.dedup();
        right.dedup();
        assert_eq!((left.len(), right.len()), (2, 2));
    }

    #[test]
    fn test_dissimilar_lines_stay_apart() {
        assert_eq!(
            pair_lines(&["abc"], &["xyz"]),
            vec![(Some(0), None), (None, Some(0))]
        );
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", "abc"), 0.0);
        assert!((similarity("abcd", "abxy") - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_char_parts() {
        let parts = CharDiffer.diff_chars("\"b\": 2", "\"b\": 20");
        let joined_old: String = parts
            .iter()
            .filter(|p| p.kind != PartKind::Added)
            .map(|p| p.text.as_str())
            .collect();
        let joined_new: String = parts
            .iter()
            .filter(|p| p.kind != PartKind::Removed)
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(joined_old, "\"b\": 2");
        assert_eq!(joined_new, "\"b\": 20");
        assert!(parts.contains(&CharPart::new("0", PartKind::Added)));
    }
}
