mod base;
mod boxed_clone;

pub(crate) use base::Service;
pub(crate) use boxed_clone::BoxCloneService;
