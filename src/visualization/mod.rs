pub mod orbit_plot;
