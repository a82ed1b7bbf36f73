mod balance;
mod list;
mod registry;
