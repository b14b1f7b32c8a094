#![cfg(target_os = "windows")]

//! XInput device interface enumeration via SetupAPI.

use std::ptr;

use windows_sys::core::GUID;
use windows_sys::Win32::Devices::DeviceAndDriverInstallation::*;
use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;

use crate::device::DeviceKey;

/// Device interface class registered by the XInput driver.
pub const XUSB_INTERFACE_CLASS_GUID: GUID =
    GUID::from_u128(0xEC87F1E3_C13B_4100_B5F7_8B84D54260CB);

/// Interface paths are far shorter than this in practice.
const MAX_DETAIL_BYTES: u32 = 4096;

/// Owned device information set; destroyed on drop.
struct DevInfoList(HDEVINFO);

impl Drop for DevInfoList {
    fn drop(&mut self) {
        // SAFETY: the set was returned by SetupDiGetClassDevsW and is
        // destroyed once.
        unsafe {
            SetupDiDestroyDeviceInfoList(self.0);
        }
    }
}

/// Decode a NUL-terminated UTF-16 buffer.
fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

/// Read the interface path of one enumerated interface.
fn interface_path(list: &DevInfoList, iface: &SP_DEVICE_INTERFACE_DATA) -> Option<String> {
    let mut required: u32 = 0;
    // SAFETY: size query; a null detail buffer with size 0 is allowed.
    unsafe {
        SetupDiGetDeviceInterfaceDetailW(
            list.0,
            iface,
            ptr::null_mut(),
            0,
            &mut required,
            ptr::null_mut(),
        );
    }
    if required == 0 || required > MAX_DETAIL_BYTES {
        return None;
    }

    // u32 storage keeps the detail struct aligned.
    let mut storage = vec![0u32; (required as usize).div_ceil(4)];
    let detail = storage.as_mut_ptr() as *mut SP_DEVICE_INTERFACE_DETAIL_DATA_W;
    // SAFETY: `storage` is at least `required` bytes and 4-byte aligned.
    let ok = unsafe {
        (*detail).cbSize = std::mem::size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() as u32;
        SetupDiGetDeviceInterfaceDetailW(
            list.0,
            iface,
            detail,
            required,
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    if ok == 0 {
        return None;
    }

    // DevicePath starts right after cbSize.
    let offset = std::mem::offset_of!(SP_DEVICE_INTERFACE_DETAIL_DATA_W, DevicePath);
    let chars = (required as usize).saturating_sub(offset) / 2;
    // SAFETY: the path lies inside `storage` and is NUL-terminated by SetupAPI.
    let wide = unsafe {
        std::slice::from_raw_parts((storage.as_ptr() as *const u8).add(offset) as *const u16, chars)
    };
    Some(wide_to_string(wide))
}

/// Interface paths of all present XInput devices, sorted.
///
/// Returns an empty list when SetupAPI is unavailable.
pub fn list_interfaces() -> Vec<DeviceKey> {
    // SAFETY: plain FFI call with valid pointers.
    let handle = unsafe {
        SetupDiGetClassDevsW(
            &XUSB_INTERFACE_CLASS_GUID,
            ptr::null(),
            ptr::null_mut(),
            DIGCF_DEVICEINTERFACE | DIGCF_PRESENT,
        )
    };
    if handle as isize == INVALID_HANDLE_VALUE as isize {
        log::debug!("SetupDiGetClassDevsW failed");
        return Vec::new();
    }
    let list = DevInfoList(handle);

    let mut keys = Vec::new();
    for index in 0u32.. {
        // SAFETY: zeroed POD struct with cbSize filled in below.
        let mut iface: SP_DEVICE_INTERFACE_DATA = unsafe { std::mem::zeroed() };
        iface.cbSize = std::mem::size_of::<SP_DEVICE_INTERFACE_DATA>() as u32;
        // SAFETY: `iface` is a valid out pointer.
        let ok = unsafe {
            SetupDiEnumDeviceInterfaces(
                list.0,
                ptr::null(),
                &XUSB_INTERFACE_CLASS_GUID,
                index,
                &mut iface,
            )
        };
        if ok == 0 {
            break;
        }
        if let Some(path) = interface_path(&list, &iface) {
            keys.push(DeviceKey::new(path));
        }
    }

    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_strings_stop_at_nul() {
        let wide: Vec<u16> = "\\\\?\\usb#vid_045e\0junk".encode_utf16().collect();
        assert_eq!(wide_to_string(&wide), "\\\\?\\usb#vid_045e");
        let unterminated: Vec<u16> = "abc".encode_utf16().collect();
        assert_eq!(wide_to_string(&unterminated), "abc");
    }
}
