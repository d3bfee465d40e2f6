pub(crate) mod anim;
pub(crate) mod ease;
