use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

const FACADE_NAME: &str = "ogre";
const CRATE_PREFIX: &str = "ogre_";

/// The caller's parsed `Cargo.toml`, used to find how a workspace crate is
/// reachable from the code a macro expands into.
///
/// # Resolution rules
///
/// For a requested crate such as `ogre_serial`, in `dependencies` and then
/// `dev-dependencies`:
///
/// 1. A dependency with that name gives `::ogre_serial`.
/// 2. A renamed dependency (`serial = { package = "ogre_serial" }`) gives `::serial`.
/// 3. A dependency on the façade `ogre` gives `::ogre::serial`.
///
/// Otherwise the absolute path `::ogre_serial` is returned.
///
/// A crate referring to itself should contain `extern crate self as ogre_serial;`
/// so that the fallback path also resolves inside the crate.
///
/// # Example
///
/// ```rust
/// # use ogre_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("ogre_serial"));
/// ```
#[derive(Debug)]
pub struct Manifest {
    document: Document<Box<str>>,
    modified_time: SystemTime,
}

impl Manifest {
    fn manifest_path() -> PathBuf {
        let dir = env::var_os("CARGO_MANIFEST_DIR")
            .expect("CARGO_MANIFEST_DIR should be auto-defined by cargo.");
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        path
    }

    fn load(path: &Path, modified_time: SystemTime) -> Self {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("Unable to read cargo manifest: {}", path.display()));
        let document = Document::parse(text.into_boxed_str())
            .unwrap_or_else(|_| panic!("Failed to parse cargo manifest: {}", path.display()));
        Self {
            document,
            modified_time,
        }
    }

    fn parse_path(text: &str) -> syn::Path {
        syn::parse_str(text).unwrap_or_else(|_| panic!("`{text}` is not a valid path"))
    }

    // The key under which `name` is reachable, honouring `package = "..."` renames.
    fn dependency_key(deps: &Table, name: &str) -> Option<String> {
        if deps.contains_key(name) {
            return Some(name.replace('-', "_"));
        }
        deps.iter().find_map(|(key, item)| {
            let package = item.get("package").and_then(Item::as_str)?;
            (package == name).then(|| key.replace('-', "_"))
        })
    }

    fn find_in(deps: &Table, name: &str) -> Option<syn::Path> {
        if let Some(key) = Self::dependency_key(deps, name) {
            return Some(Self::parse_path(&format!("::{key}")));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        let facade = Self::dependency_key(deps, FACADE_NAME)?;
        Some(Self::parse_path(&format!("::{facade}::{module}")))
    }

    /// Returns the path under which the crate `name` is visible to the caller.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        for section in ["dependencies", "dev-dependencies"] {
            if let Some(Item::Table(deps)) = self.document.get(section)
                && let Some(path) = Self::find_in(deps, name)
            {
                return path;
            }
        }
        Self::parse_path(&format!("::{name}"))
    }

    /// Runs `func` with the caller's manifest.
    ///
    /// Manifests are cached per path and re-read when the file changes.
    /// Call this once per macro invocation and keep the result.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::manifest_path();
        let modified_time = std::fs::metadata(&path)
            .and_then(|metadata| metadata.modified())
            .unwrap_or_else(|_| panic!("Cargo manifest does not exist at {}", path.display()));

        {
            let cache = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = cache.get(&path)
                && manifest.modified_time == modified_time
            {
                return func(manifest);
            }
        }

        let manifest = Self::load(&path, modified_time);
        let result = func(&manifest);
        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);
        result
    }
}
