mod app_flow;
mod config;
mod gateway;
mod session;
