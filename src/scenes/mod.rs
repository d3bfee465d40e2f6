//! The MRI explainer scenes, each built from a `SceneContext`.

pub(crate) mod catalog;
pub(crate) mod encoding;
pub(crate) mod equations;
pub(crate) mod kspace;
pub(crate) mod layout;
pub(crate) mod sequence;
