//! Property tests for template naming.

use std::collections::BTreeSet;
use std::fs;

use proptest::prelude::*;
use stencil_render::{file_ext, FileSystem, DEFAULT_EXTENSIONS};
use tempfile::TempDir;

// Relative paths of one to three lowercase segments.
fn relative_path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_]{0,7}", 1..4)
}

fn extension_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(".tmpl"), Just(".html")]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_name_is_relative_path_without_extension(
        entries in prop::collection::vec((relative_path_strategy(), extension_strategy()), 1..6)
    ) {
        let dir = TempDir::new().unwrap();
        let mut expected = BTreeSet::new();

        for (segments, ext) in &entries {
            let name = segments.join("/");
            // First extension wins when two files share a name.
            if !expected.insert(name.clone()) {
                continue;
            }

            let path = dir.path().join(format!("{}{}", name, ext));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, name.as_bytes()).unwrap();
        }

        let fs = FileSystem::from_dirs(dir.path(), &[] as &[&str], DEFAULT_EXTENSIONS).unwrap();
        let names: BTreeSet<String> = fs.names().map(str::to_string).collect();
        prop_assert_eq!(&names, &expected);

        for file in &fs {
            prop_assert!(!file.name().contains('\\'));
            prop_assert!(!file.name().ends_with(file.ext()));
            let data = file.data().unwrap();
            prop_assert_eq!(data.as_ref(), file.name().as_bytes());
        }
    }

    #[test]
    fn test_file_ext_starts_at_first_dot(stem in "[a-z]{1,8}", rest in "(\\.[a-z]{1,4}){0,3}") {
        let file_name = format!("{}{}", stem, rest);
        prop_assert_eq!(file_ext(&file_name), rest.as_str());
    }
}
