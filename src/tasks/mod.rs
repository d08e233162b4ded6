pub mod stats_poller;
