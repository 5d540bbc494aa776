//! Configuration access port trait.

use std::collections::BTreeMap;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// All keys of `section` with a value. Empty if the section is absent.
    fn get_section(&self, section: &str) -> BTreeMap<String, String>;
}
