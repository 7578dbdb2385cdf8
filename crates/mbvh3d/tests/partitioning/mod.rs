mod linear_bounds;
mod two_level_build;
