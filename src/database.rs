/// Flat string key-value storage backing the "remember me" behaviour of the
/// login page. A missing key is the normal first-visit state.
pub trait PrefsDb {
    type Error;
    fn put(&self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    fn remember_email(&self, email: &str) -> Result<(), Self::Error> {
        self.put(LAST_EMAIL, email)
    }

    fn last_email(&self) -> Result<Option<String>, Self::Error> {
        self.get(LAST_EMAIL)
    }
}

const PREFS: &[u8] = b"prefs";
const LAST_EMAIL: &str = "userEmail";

impl PrefsDb for sled::Db {
    type Error = sled::Error;

    fn put(&self, key: &str, value: &str) -> sled::Result<()> {
        let prefs = self.open_tree(PREFS)?;
        prefs.insert(key.as_bytes(), value.as_bytes())?;
        prefs.flush()?;
        Ok(())
    }

    fn get(&self, key: &str) -> sled::Result<Option<String>> {
        let prefs = self.open_tree(PREFS)?;
        Ok(prefs
            .get(key.as_bytes())?
            .map(|value| String::from_utf8_lossy(&value).into_owned()))
    }
}
