//! Domain logon through `LogonUserW`

use super::context::{ContextOptions, PrincipalContext};
use crate::error::DirectoryError;
use windows::core::{Error as WinError, PCWSTR, PWSTR};
use windows::Win32::Foundation::{
    CloseHandle, ERROR_ACCOUNT_DISABLED, ERROR_ACCOUNT_EXPIRED, ERROR_ACCOUNT_LOCKED_OUT,
    ERROR_ACCOUNT_RESTRICTION, ERROR_LOGON_FAILURE, ERROR_PASSWORD_EXPIRED,
    ERROR_PASSWORD_MUST_CHANGE, HANDLE,
};
use windows::Win32::Security::{
    LogonUserW, LOGON32_LOGON_NETWORK, LOGON32_PROVIDER_DEFAULT, LOGON32_PROVIDER_WINNT50,
};
use windows::Win32::System::SystemInformation::{ComputerNameDnsDomain, GetComputerNameExW};

/// Principal context for the DNS domain this host is joined to
pub(crate) struct DomainContext {
    domain: String,
}

impl DomainContext {
    pub(crate) fn current() -> Result<Self, DirectoryError> {
        let domain = dns_domain()?;
        if domain.is_empty() {
            return Err(DirectoryError::Connection(
                "this host is not joined to an Active Directory domain".to_string(),
            ));
        }
        Ok(Self { domain })
    }

    /// `DOMAIN\user` keeps its domain, a UPN needs none, a bare name gets ours.
    fn split_account<'a>(&'a self, username: &'a str) -> (&'a str, Option<&'a str>) {
        if let Some((domain, account)) = username.split_once('\\') {
            (account, Some(domain))
        } else if username.contains('@') {
            (username, None)
        } else {
            (username, Some(self.domain.as_str()))
        }
    }
}

impl PrincipalContext for DomainContext {
    fn validate_credentials(
        &self,
        username: &str,
        password: &str,
        options: ContextOptions,
    ) -> Result<bool, DirectoryError> {
        let (account, domain) = self.split_account(username);
        let account = wide(account);
        let domain = domain.map(wide);
        let mut password = wide(password);

        let provider = match options {
            ContextOptions::Negotiate => LOGON32_PROVIDER_WINNT50,
            ContextOptions::Default => LOGON32_PROVIDER_DEFAULT,
        };

        let mut token = HANDLE::default();
        let result = unsafe {
            LogonUserW(
                PCWSTR(account.as_ptr()),
                domain
                    .as_ref()
                    .map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
                PCWSTR(password.as_ptr()),
                LOGON32_LOGON_NETWORK,
                provider,
                &mut token,
            )
        };
        password.iter_mut().for_each(|c| *c = 0);

        match result {
            Ok(()) => {
                unsafe {
                    let _ = CloseHandle(token);
                }
                Ok(true)
            }
            Err(e) if is_rejected_logon(&e) => Ok(false),
            Err(e) => Err(DirectoryError::Connection(format!("LogonUserW failed: {}", e))),
        }
    }
}

fn is_rejected_logon(error: &WinError) -> bool {
    [
        ERROR_LOGON_FAILURE,
        ERROR_ACCOUNT_DISABLED,
        ERROR_ACCOUNT_EXPIRED,
        ERROR_ACCOUNT_LOCKED_OUT,
        ERROR_ACCOUNT_RESTRICTION,
        ERROR_PASSWORD_EXPIRED,
        ERROR_PASSWORD_MUST_CHANGE,
    ]
    .iter()
    .any(|code| error.code() == code.to_hresult())
}

fn dns_domain() -> Result<String, DirectoryError> {
    let mut size = 0u32;
    // Sizing call, expected to fail with ERROR_MORE_DATA
    let _ = unsafe { GetComputerNameExW(ComputerNameDnsDomain, None, &mut size) };
    if size == 0 {
        return Ok(String::new());
    }

    let mut buffer = vec![0u16; size as usize];
    unsafe {
        GetComputerNameExW(
            ComputerNameDnsDomain,
            Some(PWSTR(buffer.as_mut_ptr())),
            &mut size,
        )
    }
    .map_err(|e| DirectoryError::Unexpected(format!("GetComputerNameExW failed: {}", e)))?;

    Ok(String::from_utf16_lossy(&buffer[..size as usize]))
}

fn wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}
