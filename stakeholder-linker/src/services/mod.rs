// Business logic services layer
//
// Everything here is independent of the terminal surface so the same flow
// can back the one-shot commands and the interactive picker.

pub mod stakeholders;
