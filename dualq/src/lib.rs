#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use dualq_aqm::*;
pub use dualq_sim::*;
