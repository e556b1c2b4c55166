#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use ogre_serial as serial;
pub use ogre_utils as utils;
