pub mod vpa;
