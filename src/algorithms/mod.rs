pub(crate) mod batch;
pub mod common;
pub mod mass;
pub(crate) mod mpx;
pub(crate) mod stamp;
pub(crate) mod stampi;
pub(crate) mod stmp;
pub(crate) mod stomp;
