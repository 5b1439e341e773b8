//! Lifecycle driver running every structure over the configured integers.
//!
//! A run is split in the two hooks of a loadable module: [`Suite::init`] parses the
//! integers and runs the stages one after another, and [`Suite::exit`] only reports
//! that the run is over. Each stage builds its own structure from a fresh parse of
//! the token string, walks it, and tears it down before the next stage starts.
//!
//! Stage sections in the [`Trace`] are delimited by `Begin {name} test:` and
//! `End {name} test` banners, where `name` is one of [`LIST`], [`TREE`], [`HASH`],
//! [`SPARSE`] and [`BITMAP`].
use anyhow::Result;

use crate::bit_encoder::BitEncoder;
use crate::config::Config;
use crate::hash_index::HashIndex;
use crate::ordered_list::OrderedList;
use crate::ordered_tree::OrderedTree;
use crate::sparse_array::{key_of, Mark, SparseArray};
use crate::tokens;
use crate::trace::Trace;
use crate::Accounted;

/// Section name of the list stage.
pub const LIST: &str = "linked list";
/// Section name of the tree stage.
pub const TREE: &str = "red black tree";
/// Section name of the hash stage.
pub const HASH: &str = "hash table";
/// Section name of the sparse array stage.
pub const SPARSE: &str = "sparse array";
/// Section name of the odd-number report nested in the sparse array stage.
pub const SPARSE_ODD: &str = "sparse array odd number";
/// Section name of the gang lookup report nested in the sparse array stage.
pub const SPARSE_GANG: &str = "sparse array gang lookup";
/// Section name of the bitmap stage.
pub const BITMAP: &str = "bitmap";

/// Mark carried by odd values in the sparse array stage.
pub const ODD: Mark = Mark::MARK_0;

/// Line emitted first by [`Suite::init`].
pub const LOADED: &str = "Module loaded ...";
/// Line emitted by [`Suite::exit`].
pub const EXITING: &str = "Module exiting ...";

/// Checks if `value` is odd on its two's-complement bits, so `-5` is odd.
#[inline(always)]
pub const fn is_odd(value: i64) -> bool {
    value & 1 == 1
}

/// Runner of the five structure life-cycles.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kds::{suite, Config, Suite};
///
/// let mut suite = Suite::new(Config::new("3 1 2 -5 abc 1000"))?;
/// suite.init();
///
/// let list = suite.trace().section(suite::LIST).unwrap();
/// assert_eq!(list, ["3", "1", "2", "-5", "1000"]);
///
/// let gang = suite.trace().section(suite::SPARSE_GANG).unwrap();
/// assert_eq!(gang, ["1", "3", "-5"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Suite {
    config: Config,
    trace: Trace,
    teardowns: Vec<(&'static str, bool)>,
}

impl Suite {
    /// Creates a runner for `config`.
    ///
    /// # Errors
    ///
    /// An error is returned if `config` is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            trace: Trace::new(),
            teardowns: vec![],
        })
    }

    /// Emits the load line and, if any integers are configured, runs every stage.
    ///
    /// Unparsable tokens and failed allocations are skipped, so this never fails.
    pub fn init(&mut self) -> &Trace {
        self.trace.emit(LOADED);
        if self.config.int_str().is_empty() {
            return &self.trace;
        }

        let mut parsed = tokens::parse(self.config.int_str());
        for v in parsed.by_ref() {
            self.trace.emit(v.to_string());
        }
        if parsed.skipped() != 0 {
            log::debug!("dropped {} malformed tokens", parsed.skipped());
        }

        self.run_list();
        self.run_tree();
        self.run_hash();
        self.run_sparse();
        self.run_bitmap();
        &self.trace
    }

    /// Emits the exit line.
    pub fn exit(&mut self) -> &Trace {
        self.trace.emit(EXITING);
        &self.trace
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the lines recorded so far.
    pub const fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Returns, per finished stage, its section name and whether its structure
    /// released everything it allocated.
    pub fn teardowns(&self) -> &[(&'static str, bool)] {
        &self.teardowns
    }

    /// Consumes the runner and returns its trace.
    pub fn into_trace(self) -> Trace {
        self.trace
    }

    fn run_list(&mut self) {
        self.trace.emit(begin(LIST));
        let mut list = OrderedList::with_limit(self.config.alloc_limit());
        for v in tokens::parse(self.config.int_str()) {
            if let Err(e) = list.append(v) {
                log::warn!("{LIST}: skipped {v}: {e}");
            }
        }
        let trace = &mut self.trace;
        list.drain_and_consume(|v| trace.emit(v.to_string()));
        let ok = check_teardown(LIST, &list);
        self.teardowns.push((LIST, ok));
        self.trace.emit(end(LIST));
    }

    fn run_tree(&mut self) {
        self.trace.emit(begin(TREE));
        let mut tree = OrderedTree::with_limit(self.config.alloc_limit());
        for v in tokens::parse(self.config.int_str()) {
            if let Err(e) = tree.insert(v) {
                log::warn!("{TREE}: skipped {v}: {e}");
            }
        }
        log::debug!("{TREE}: {} nodes, height {}", tree.len(), tree.height());
        let trace = &mut self.trace;
        tree.drain_in_order(|v| trace.emit(v.to_string()));
        let ok = check_teardown(TREE, &tree);
        self.teardowns.push((TREE, ok));
        self.trace.emit(end(TREE));
    }

    fn run_hash(&mut self) {
        self.trace.emit(begin(HASH));
        let mut ht =
            match HashIndex::with_limit(self.config.hash_bits(), self.config.alloc_limit()) {
                Ok(ht) => ht,
                Err(e) => {
                    log::error!("{HASH}: {e}");
                    self.trace.emit(end(HASH));
                    return;
                }
            };
        for v in tokens::parse(self.config.int_str()) {
            if let Err(e) = ht.insert(v) {
                log::debug!("{HASH}: skipped {v}: {e}");
            }
        }
        let trace = &mut self.trace;
        ht.drain_safe(|ht, v| {
            trace.emit(v.to_string());
            for found in ht.for_each_possible(v) {
                trace.emit(format!("hash table lookup prints: {found}"));
            }
        });
        let ok = check_teardown(HASH, &ht);
        self.teardowns.push((HASH, ok));
        self.trace.emit(end(HASH));
    }

    fn run_sparse(&mut self) {
        self.trace.emit(begin(SPARSE));
        let mut xa = SparseArray::with_limit(self.config.alloc_limit());
        for v in tokens::parse(self.config.int_str()) {
            if let Err(e) = xa.insert(key_of(v), v) {
                log::warn!("{SPARSE}: skipped {v}: {e}");
            }
        }

        let trace = &mut self.trace;
        xa.for_each(|xa, key, v| {
            trace.emit(v.to_string());
            if is_odd(v) {
                xa.set_mark(key, ODD);
            }
        });

        trace.emit(begin(SPARSE_ODD));
        xa.for_each_marked(ODD, |_, _, v| trace.emit(v.to_string()));
        trace.emit(end(SPARSE_ODD));

        let n = xa.len();
        trace.emit(begin(SPARSE_GANG));
        for v in xa.gang_lookup_by_mark(ODD, 0, n) {
            trace.emit(v.to_string());
        }
        trace.emit(end(SPARSE_GANG));

        trace.emit("Removing sparse array entries ...");
        for v in xa.gang_lookup(0, n) {
            if xa.erase(key_of(v)).is_none() {
                log::warn!("{SPARSE}: {v} vanished before erase");
            }
        }
        let leftover = xa.gang_lookup(0, n);
        if !leftover.is_empty() {
            log::warn!("{SPARSE}: {} entries left after erase", leftover.len());
        }
        let ok = check_teardown(SPARSE, &xa) && leftover.is_empty();
        self.teardowns.push((SPARSE, ok));
        self.trace.emit(end(SPARSE));
    }

    fn run_bitmap(&mut self) {
        self.trace.emit(begin(BITMAP));
        let mut enc = BitEncoder::new();
        for v in tokens::parse(self.config.int_str()) {
            let positions = enc.encode(v);
            self.trace.emit(format!("bits that are turned on for {v}:"));
            for pos in positions {
                self.trace.emit(pos.to_string());
            }
            self.trace.emit("finished one iteration");
        }
        enc.clear();
        self.teardowns.push((BITMAP, enc.is_clear()));
        self.trace.emit(end(BITMAP));
    }
}

fn begin(name: &str) -> String {
    format!("Begin {name} test:")
}

fn end(name: &str) -> String {
    format!("End {name} test")
}

fn check_teardown<A>(name: &str, container: &A) -> bool
where
    A: Accounted,
{
    let allocs = container.allocs();
    let ok = container.is_torn_down();
    if ok {
        log::debug!("{name}: freed all {} allocations", allocs.allocated());
    } else {
        log::warn!(
            "{name}: {} of {} allocations still live",
            allocs.live(),
            allocs.allocated()
        );
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn gen_int_str(len: usize, seed: u64) -> (String, Vec<i64>) {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let vals: Vec<i64> = (0..len).map(|_| rng.gen_range(0..=1000)).collect();
        let s = vals
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        (s, vals)
    }

    fn ints(lines: &[String]) -> Vec<i64> {
        lines.iter().map(|l| l.parse().unwrap()).collect()
    }

    fn run(config: Config) -> Trace {
        let mut suite = Suite::new(config).unwrap();
        suite.init();
        suite.exit();
        suite.into_trace()
    }

    #[test_log::test]
    fn test_end_to_end() {
        let trace = run(Config::new("3 1 2 -5 abc 1000"));
        let lines = trace.lines();
        assert_eq!(lines[0], LOADED);
        assert_eq!(&lines[1..6], ["3", "1", "2", "-5", "1000"]);
        assert_eq!(lines.last().map(String::as_str), Some(EXITING));

        assert_eq!(ints(trace.section(LIST).unwrap()), vec![3, 1, 2, -5, 1000]);
        assert_eq!(
            ints(trace.section(TREE).unwrap()),
            vec![-5, 1, 2, 3, 1000]
        );

        let hash = trace.section(HASH).unwrap();
        let mut visited: Vec<i64> = hash
            .iter()
            .filter(|l| !l.starts_with("hash table lookup prints: "))
            .map(|l| l.parse().unwrap())
            .collect();
        visited.sort_unstable();
        assert_eq!(visited, vec![-5, 1, 2, 3, 1000]);
        assert_eq!(hash.len(), 10);

        assert_eq!(ints(trace.section(SPARSE_ODD).unwrap()), vec![1, 3, -5]);
        assert_eq!(ints(trace.section(SPARSE_GANG).unwrap()), vec![1, 3, -5]);

        let bitmap = trace.section(BITMAP).unwrap();
        assert_eq!(
            &bitmap[..4],
            ["bits that are turned on for 3:", "8", "9", "finished one iteration"]
        );
        assert_eq!(
            bitmap
                .iter()
                .filter(|l| *l == "finished one iteration")
                .count(),
            5
        );
    }

    #[test_log::test]
    fn test_sparse_visits_ascending_keys() {
        let trace = run(Config::new("3 1 2 -5 1000"));
        let sparse = trace.section(SPARSE).unwrap();
        assert_eq!(&sparse[..5], ["1", "2", "3", "1000", "-5"]);
        assert!(sparse.contains(&"Removing sparse array entries ...".to_string()));
    }

    #[test_log::test]
    fn test_empty_int_str() {
        let trace = run(Config::default());
        assert_eq!(trace.lines(), [LOADED, EXITING]);
    }

    #[test_log::test]
    fn test_only_malformed() {
        let trace = run(Config::new("x y"));
        assert!(trace.section(LIST).unwrap().is_empty());
        assert!(trace.section(BITMAP).unwrap().is_empty());
        assert_eq!(trace.lines()[1], begin(LIST));
    }

    #[test_log::test]
    fn test_random_stages() {
        for seed in 0..5 {
            let (s, vals) = gen_int_str(300, seed);
            let trace = run(Config::new(s).with_hash_bits(6));

            assert_eq!(ints(trace.section(LIST).unwrap()), vals);

            let mut sorted = vals.clone();
            sorted.sort_unstable();
            assert_eq!(ints(trace.section(TREE).unwrap()), sorted);

            let mut dedup = sorted.clone();
            dedup.dedup();
            let odd: Vec<_> = dedup.iter().copied().filter(|&v| is_odd(v)).collect();
            assert_eq!(ints(trace.section(SPARSE_ODD).unwrap()), odd);
            assert_eq!(ints(trace.section(SPARSE_GANG).unwrap()), odd);
        }
    }

    #[test_log::test]
    fn test_alloc_limit_skips() {
        let trace = run(Config::new("5 4 3 2 1").with_alloc_limit(Some(3)));
        assert_eq!(ints(trace.section(LIST).unwrap()), vec![5, 4, 3]);
        assert_eq!(ints(trace.section(TREE).unwrap()), vec![3, 4, 5]);
        // Bitmap stage does not allocate per value.
        assert_eq!(
            trace
                .section(BITMAP)
                .unwrap()
                .iter()
                .filter(|l| *l == "finished one iteration")
                .count(),
            5
        );
    }

    #[test_log::test]
    fn test_every_stage_torn_down() {
        let stages = [LIST, TREE, HASH, SPARSE, BITMAP];
        let mut configs = vec![
            Config::new("3 1 2 -5 abc 1000"),
            Config::new("5 4 3 2 1 -1 -2").with_alloc_limit(Some(3)),
        ];
        for seed in 0..3 {
            configs.push(Config::new(gen_int_str(200, seed).0).with_hash_bits(3));
        }
        for config in configs {
            let mut suite = Suite::new(config).unwrap();
            suite.init();
            let names: Vec<_> = suite.teardowns().iter().map(|&(name, _)| name).collect();
            assert_eq!(names, stages);
            for &(name, ok) in suite.teardowns() {
                assert!(ok, "{name} was not torn down");
            }
        }
    }

    #[test_log::test]
    fn test_check_teardown_detects_live_nodes() {
        let mut xa = SparseArray::new();
        xa.insert(key_of(-5), -5).unwrap();
        xa.insert(3, 3).unwrap();
        assert!(!check_teardown(SPARSE, &xa));

        assert_eq!(xa.erase(3), Some(3));
        assert!(!check_teardown(SPARSE, &xa));

        assert_eq!(xa.erase(key_of(-5)), Some(-5));
        assert!(xa.gang_lookup(0, 2).is_empty());
        assert!(check_teardown(SPARSE, &xa));
    }

    #[test_log::test]
    fn test_empty_int_str_runs_no_stage() {
        let mut suite = Suite::new(Config::default()).unwrap();
        suite.init();
        assert!(suite.teardowns().is_empty());
    }

    #[test_log::test]
    fn test_hash_stage_closes_section_on_bad_bits() {
        let mut suite = Suite {
            config: Config::new("1 2").with_hash_bits(0),
            trace: Trace::new(),
            teardowns: vec![],
        };
        suite.run_hash();
        assert!(suite.trace().section(HASH).unwrap().is_empty());
        assert!(suite.teardowns().is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let e = Suite::new(Config::new("1").with_hash_bits(30));
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("hash bits must be in 1..=20, but got 30.".to_string())
        );
    }

    #[test]
    fn test_is_odd() {
        assert!(is_odd(3));
        assert!(is_odd(-5));
        assert!(!is_odd(0));
        assert!(!is_odd(-2));
    }
}
