pub mod analytics_handlers;
pub mod bunny_handlers;
pub mod fox_handlers;
pub mod health_handlers;
pub mod rabbit_hole_handlers;
pub mod validation;
