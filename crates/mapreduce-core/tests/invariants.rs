//! Property-based checks for invariants that must hold for any input, not
//! just the handful of concrete scenarios in `word_count.rs`: conservation
//! of emitted pairs through to reduced output, and routing stability.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use mapreduce_core::{partitioner, run, EmitCtx, ReduceCtx};
use proptest::prelude::*;

fn temp_file(tag: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "mapreduce-core-prop-{tag}-{:?}",
        std::thread::current().id()
    ));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("in.txt");
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

proptest! {
    /// Every word in the input appears in the reduced output with a count
    /// equal to its occurrence count, and only those words appear.
    #[test]
    fn reduced_counts_match_input_occurrences(
        words in prop::collection::vec("[a-z]{1,8}", 0..200),
        num_partitions in 1usize..6,
    ) {
        let text = words.join(" ");
        let file = temp_file("conservation", &text);

        let mut expected: HashMap<String, usize> = HashMap::new();
        for w in &words {
            *expected.entry(w.clone()).or_insert(0) += 1;
        }

        let results = Arc::new(Mutex::new(HashMap::new()));
        let results_for_reduce = Arc::clone(&results);
        run(
            &[file],
            |path, ctx: &EmitCtx| {
                let text = fs::read_to_string(path).unwrap();
                for token in text.split_whitespace() {
                    ctx.emit(token, "1");
                }
            },
            move |key, ctx: &ReduceCtx| {
                let mut count = 0;
                while ctx.get_next(key).is_some() {
                    count += 1;
                }
                results_for_reduce.lock().unwrap().insert(key.to_string(), count);
            },
            3,
            num_partitions,
        ).unwrap();

        let got = results.lock().unwrap().clone();
        prop_assert_eq!(got, expected);
    }

    /// Routing a key to a partition is a pure function of the key and the
    /// partition count: same inputs, same output, every time.
    #[test]
    fn partitioner_is_deterministic(key in "[a-zA-Z0-9_-]{0,32}", num_partitions in 1usize..64) {
        let a = partitioner(&key, num_partitions);
        let b = partitioner(&key, num_partitions);
        prop_assert_eq!(a, b);
        prop_assert!(a < num_partitions);
    }
}
