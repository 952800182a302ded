pub mod tikwm;
