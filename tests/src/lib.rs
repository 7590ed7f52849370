#[cfg(test)]
mod discovery;
#[cfg(test)]
mod transfer;
#[cfg(test)]
mod util;
