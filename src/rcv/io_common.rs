use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Drops the empty cells at the end of a row.
///
/// Blanks in the middle of a ballot are kept, the ballot is then rejected.
pub fn trim_choices(choices: &[String]) -> Vec<String> {
    let len = choices
        .iter()
        .rposition(|s| !s.trim().is_empty())
        .map(|idx| idx + 1)
        .unwrap_or(0);
    choices[..len].iter().map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn trim() {
        assert_eq!(
            trim_choices(&strings(&["A", " B ", "", " "])),
            strings(&["A", "B"])
        );
        assert_eq!(
            trim_choices(&strings(&["A", "", "C"])),
            strings(&["A", "", "C"])
        );
        assert!(trim_choices(&strings(&["", ""])).is_empty());
    }

    #[test]
    fn default_ids() {
        let f = make_default_id("/tmp/data/ballots.csv");
        assert_eq!(f(12), "ballots.csv-00000012");
    }
}
