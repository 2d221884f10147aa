macro_rules! range_check {
    ($n:expr, 0, $upper:expr) => {{
        if $n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!("{} is out of range [0, {}]: {}", stringify!($n), $upper, $n),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
    ($n:expr, $lower:expr, $upper:expr) => {{
        if $n < $lower || $n > $upper {
            ::std::result::Result::Err(::std::io::Error::new(
                ::std::io::ErrorKind::InvalidData,
                format!("{} is out of range [{}, {}]: {}", stringify!($n), $lower, $upper, $n),
            ))
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}

pub(crate) use range_check;

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    #[test]
    fn in_range() {
        let id = 31u8;
        range_check!(id, 0, 31).unwrap();
    }

    #[test]
    fn out_of_range() {
        let id = 32u8;
        range_check!(id, 0, 31).unwrap_err();
    }
}
